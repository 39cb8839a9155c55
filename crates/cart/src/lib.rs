//! Shopping cart domain module.
//!
//! A [`CartSession`] owns the cart lines and the running paid total; a
//! [`CartService`] pairs it with a read-only catalog and exposes the
//! operations a storefront calls. Pure in-memory logic: no IO, no storage.

pub mod line_item;
pub mod service;
pub mod session;

pub use line_item::{CartLineItem, calculate_cart_total};
pub use service::{CART_AGGREGATE_TYPE, CartService};
pub use session::{
    AddProduct, CartCommand, CartEmptied, CartEvent, CartId, CartSession, DecreaseQuantity,
    EmptyCart, IncreaseQuantity, LineAdded, LineRemoved, Pay, PaymentReceived, QuantityChanged,
    RemoveProduct, SetQuantity,
};
