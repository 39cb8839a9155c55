//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two values with the same attributes are
/// equal, and "modifying" one means building a new one. [`crate::Money`] is the
/// canonical example in this workspace; a cart line item, by contrast, is
/// identified by its product id and is not a value object.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
