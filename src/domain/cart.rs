use serde::Serialize;
use super::money::{Money, Quantity};
use super::product::Product;
use super::sale::SaleItem;

/// One product in the cart, with the product fields captured when it was added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: Money,
    /// Stock level seen when the line was created; informational only.
    pub stock: Quantity,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Money {
        self.price.times(self.quantity)
    }

    pub fn to_sale_item(&self) -> SaleItem {
        SaleItem {
            id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// The items a cashier is assembling for one customer. Lives only in memory
/// and holds at most one line per product id.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit. Does not check available stock.
    pub fn add(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|line| line.product_id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                stock: product.stock,
                quantity: 1,
            }),
        }
    }

    /// Sets a line's quantity, clamping negatives to zero. A zero line stays
    /// in the cart until removed. Unknown ids are ignored.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.product_id == product_id) {
            line.quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        }
    }

    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
