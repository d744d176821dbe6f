use crate::actor_framework::Entity;
use crate::domain::{Sale, SaleCreate};

impl Entity for Sale {
    type Id = String;
    type CreatePayload = SaleCreate;
    type Patch = (); // sales are never edited
    type Action = ();
    type ActionResult = ();

    const COLLECTION: &'static str = "sales";

    fn id(&self) -> &String { &self.id }

    /// Creates a Sale from the recorded checkout.
    ///
    /// # Notes
    /// `items` are copies of the cart lines, so later catalog edits never
    /// reach back into a recorded sale.
    fn from_create(id: String, payload: SaleCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            checkout_id: payload.checkout_id,
            date: payload.date,
            items: payload.items,
            total: payload.total,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err(format!("Sale {} is immutable", self.id))
    }

    fn on_delete(&self) -> Result<(), String> {
        Err(format!("Sale {} is immutable", self.id))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
