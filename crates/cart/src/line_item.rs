use serde::{Deserialize, Serialize};

use fruitcart_core::{DomainError, DomainResult, Entity, Money};
use fruitcart_products::{Product, ProductId};

/// A product copied into the cart together with a cart-local quantity.
///
/// The line owns its own copy of the catalog data, so changing the quantity
/// never touches the catalog entry it was made from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    product_id: ProductId,
    name: String,
    price: Money,
    image: String,
    quantity: u32,
}

impl CartLineItem {
    /// New line for `product` with quantity 1.
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.product_id(),
            name: product.name().to_string(),
            price: product.price(),
            image: product.image().to_string(),
            quantity: 1,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price at the time the product was added.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price * quantity`; `InvariantViolation` if that does not fit in `Money`.
    pub fn line_total(&self) -> DomainResult<Money> {
        self.price.checked_times(self.quantity).ok_or_else(|| {
            DomainError::invariant(format!(
                "line total overflows for product {} ({} x {})",
                self.product_id, self.quantity, self.price
            ))
        })
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}

impl Entity for CartLineItem {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.product_id
    }
}

/// Sum of `price * quantity` over `lines`; zero for no lines.
///
/// Overflow is reported as `InvariantViolation`, never clamped.
pub fn calculate_cart_total(lines: &[CartLineItem]) -> DomainResult<Money> {
    let mut total = Money::zero();
    for line in lines {
        total = total
            .checked_add(line.line_total()?)
            .ok_or_else(|| DomainError::invariant("cart total overflows"))?;
    }
    Ok(total)
}
