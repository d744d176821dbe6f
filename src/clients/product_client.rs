use tracing::{debug, info, instrument};
use uuid::Uuid;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use crate::actor_framework::ResourceClient;

/// Catalog manager: CRUD over the products collection plus stock actions.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self), fields(name = %product.name))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        let id = self.inner.create(product).await?;
        info!(product_id = %id, "Product added");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            other => Err(ProductError::Rejected(format!("Unexpected result: {:?}", other))),
        }
    }

    /// Takes `quantity` units out of stock on behalf of `checkout_id`,
    /// returning the remaining level.
    #[instrument(skip(self))]
    pub async fn decrement_stock(&self, id: String, checkout_id: Uuid, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        let action = ProductAction::DecrementStock { checkout_id, quantity };
        match self.inner.perform_action(id.clone(), action).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            ProductActionResult::Insufficient { available } => Err(ProductError::InsufficientStock {
                product_id: id,
                requested: quantity,
                available,
            }),
            other => Err(ProductError::Rejected(format!("Unexpected result: {:?}", other))),
        }
    }

    /// Gives back what `checkout_id` took. Returns false when that decrement
    /// never landed or was already released.
    #[instrument(skip(self))]
    pub async fn release_stock(&self, id: String, checkout_id: Uuid, quantity: u32) -> Result<bool, ProductError> {
        debug!("Sending request");
        let action = ProductAction::ReleaseStock { checkout_id, quantity };
        match self.inner.perform_action(id, action).await? {
            ProductActionResult::StockLevel(_) => Ok(true),
            ProductActionResult::NotApplied { .. } => Ok(false),
            other => Err(ProductError::Rejected(format!("Unexpected result: {:?}", other))),
        }
    }
}
