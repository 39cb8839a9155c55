//! The product catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use fruitcart_core::{DomainError, DomainResult, Money};

use crate::product::{Product, ProductId};

/// Unvalidated catalog entry as it appears in a catalog file.
///
/// ```json
/// { "product_id": 100, "name": "Cherry", "price": "1.50", "image": "images/cherry.jpg" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub image: String,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Product::new(record.product_id, record.name, record.price, record.image)
    }
}

/// Read-only, ordered list of products.
///
/// Built once at startup; no mutable access is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Build a catalog, keeping the given order. Product ids must be unique.
    pub fn new(products: Vec<Product>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.product_id()) {
                return Err(DomainError::invalid_argument(format!(
                    "duplicate product id {} in catalog",
                    product.product_id()
                )));
            }
        }
        Ok(Self { products })
    }

    /// Load a catalog from a JSON array of [`ProductRecord`]s.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let records: Vec<ProductRecord> = serde_json::from_str(json)
            .map_err(|e| DomainError::invalid_argument(format!("catalog json: {e}")))?;

        let products = records
            .into_iter()
            .map(Product::try_from)
            .collect::<DomainResult<Vec<_>>>()?;

        Self::new(products)
    }

    /// The fruit stand: Cherry, Orange and Strawberry.
    pub fn fruit_stand() -> Self {
        let entry = |id: u32, name: &str, cents: i64, image: &str| {
            Product::from_trusted_parts(ProductId::new(id), name, Money::from_cents(cents), image)
        };

        Self {
            products: vec![
                entry(100, "Cherry", 150, "images/cherry.jpg"),
                entry(101, "Orange", 200, "images/orange.jpg"),
                entry(102, "Strawberry", 300, "images/strawberry.jpg"),
            ],
        }
    }

    pub fn find_product_by_id(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id() == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find_product_by_id(product_id).is_some()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::fruit_stand()
    }
}
