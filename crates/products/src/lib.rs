//! Products domain module.
//!
//! The catalog is a fixed, read-only set of purchasable products. Entries are
//! templates, not stock counters: nothing in a cart ever writes back to them.

pub mod catalog;
pub mod product;

pub use catalog::{ProductCatalog, ProductRecord};
pub use product::{Product, ProductId};
