use serde::{Deserialize, Serialize};
use uuid::Uuid;
use super::money::{Money, Quantity};

/// Represents a sellable product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub stock: Quantity,
    /// Checkout whose stock decrement is the latest one applied here and not
    /// yet released. Lets a restock be keyed to the checkout that took it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checkout: Option<Uuid>,
}

/// Payload for adding a product. The store assigns the id.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: Money,
    pub stock: Quantity,
}

/// Partial update merged over an existing product.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<Quantity>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, stock: Quantity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            last_checkout: None,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > Quantity::ZERO
    }
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, price: Money, stock: Quantity) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
        }
    }
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }
}
