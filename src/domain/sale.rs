use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use super::money::Money;

/// Value snapshot of one cart line, taken when the sale was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// An immutable record of one completed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    #[serde(default = "Uuid::nil")]
    pub checkout_id: Uuid,
    pub date: DateTime<Utc>,
    pub items: Vec<SaleItem>,
    pub total: Money,
}

/// Payload for recording a sale. The store assigns the id.
#[derive(Debug, Clone)]
pub struct SaleCreate {
    pub checkout_id: Uuid,
    pub date: DateTime<Utc>,
    pub items: Vec<SaleItem>,
    pub total: Money,
}

impl SaleItem {
    pub fn subtotal(&self) -> Money {
        self.price.times(self.quantity)
    }
}

impl Sale {
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
