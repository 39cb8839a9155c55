//! Entity trait: things compared by identity rather than by value.

/// An object whose identity survives changes to its other attributes.
///
/// A catalog product and a cart line share the same id type: a line *is* its
/// product as far as identity goes, and two lines with the same id in one cart
/// would be a broken invariant, not two distinct values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// True when both refer to the same identity, whatever their attributes.
    fn same_identity<O: Entity<Id = Self::Id>>(&self, other: &O) -> bool {
        self.id() == other.id()
    }
}
