use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};
use super::actions::{ProductAction, ProductActionResult};

impl Entity for Product {
    type Id = String;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;

    const COLLECTION: &'static str = "products";

    fn id(&self) -> &String { &self.id }

    fn from_create(id: String, payload: ProductCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            name: payload.name,
            price: payload.price,
            stock: payload.stock,
            last_checkout: None,
        })
    }

    /// Merges the supplied fields over the stored product.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        Ok(())
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, String> {
        match action {
            ProductAction::CheckStock => {
                Ok(ProductActionResult::StockLevel(self.stock.get()))
            }
            ProductAction::DecrementStock { checkout_id, quantity } => {
                match self.stock.checked_sub(quantity) {
                    Some(remaining) => {
                        self.stock = remaining;
                        self.last_checkout = Some(checkout_id);
                        Ok(ProductActionResult::StockLevel(remaining.get()))
                    }
                    None => Ok(ProductActionResult::Insufficient { available: self.stock.get() }),
                }
            }
            ProductAction::ReleaseStock { checkout_id, quantity } => {
                if self.last_checkout != Some(checkout_id) {
                    return Ok(ProductActionResult::NotApplied { level: self.stock.get() });
                }
                self.stock = self.stock.saturating_add(quantity);
                self.last_checkout = None;
                Ok(ProductActionResult::StockLevel(self.stock.get()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use crate::domain::{Money, Quantity};

    fn milk() -> Product {
        Product::new("product_1", "Milk", Money::from_cents(120), Quantity::new(3))
    }

    #[test]
    fn test_decrement_refuses_to_go_negative() {
        let mut product = milk();
        let checkout_id = Uuid::new_v4();
        assert_eq!(
            product.handle_action(ProductAction::DecrementStock { checkout_id, quantity: 2 }),
            Ok(ProductActionResult::StockLevel(1))
        );
        assert_eq!(product.last_checkout, Some(checkout_id));

        let other = Uuid::new_v4();
        assert_eq!(
            product.handle_action(ProductAction::DecrementStock { checkout_id: other, quantity: 2 }),
            Ok(ProductActionResult::Insufficient { available: 1 })
        );
        assert_eq!(product.stock, Quantity::new(1));
        assert_eq!(product.last_checkout, Some(checkout_id));
    }

    #[test]
    fn test_release_only_undoes_the_matching_checkout_once() {
        let mut product = milk();
        let checkout_id = Uuid::new_v4();

        // nothing was taken yet
        assert_eq!(
            product.handle_action(ProductAction::ReleaseStock { checkout_id, quantity: 2 }),
            Ok(ProductActionResult::NotApplied { level: 3 })
        );

        product.handle_action(ProductAction::DecrementStock { checkout_id, quantity: 2 }).unwrap();
        assert_eq!(
            product.handle_action(ProductAction::ReleaseStock { checkout_id: Uuid::new_v4(), quantity: 2 }),
            Ok(ProductActionResult::NotApplied { level: 1 })
        );
        assert_eq!(
            product.handle_action(ProductAction::ReleaseStock { checkout_id, quantity: 2 }),
            Ok(ProductActionResult::StockLevel(3))
        );
        assert_eq!(
            product.handle_action(ProductAction::ReleaseStock { checkout_id, quantity: 2 }),
            Ok(ProductActionResult::NotApplied { level: 3 })
        );
        assert_eq!(product.last_checkout, None);
    }

    #[test]
    fn test_patch_merges_only_supplied_fields() {
        let mut product = milk();
        product.on_update(ProductPatch { price: Some(Money::from_cents(150)), ..Default::default() }).unwrap();
        assert_eq!(product.name, "Milk");
        assert_eq!(product.price, Money::from_cents(150));
        assert_eq!(product.stock, Quantity::new(3));
    }
}
