use serde::{Deserialize, Serialize};

use fruitcart_core::{DomainError, DomainResult, Entity, Money};

/// Product identifier (small integers such as `100`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl ProductId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ProductId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    product_id: ProductId,
    name: String,
    price: Money,
    image: String,
}

impl Product {
    /// Build a validated product.
    ///
    /// The name must not be blank and the price must not be negative.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        price: Money,
        image: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument(format!(
                "product {product_id}: name must not be empty"
            )));
        }
        if price.is_negative() {
            return Err(DomainError::invalid_argument(format!(
                "product {product_id}: price must not be negative (got {price})"
            )));
        }

        Ok(Self {
            product_id,
            name,
            price,
            image: image.into(),
        })
    }

    /// Skips validation; only for entries known to be valid at compile time.
    pub(crate) fn from_trusted_parts(
        product_id: ProductId,
        name: &str,
        price: Money,
        image: &str,
    ) -> Self {
        Self {
            product_id,
            name: name.to_string(),
            price,
            image: image.to_string(),
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    /// Image reference used by renderers (e.g. `images/cherry.jpg`).
    pub fn image(&self) -> &str {
        &self.image
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.product_id
    }
}
