use tracing::{debug, info, instrument};
use crate::domain::{Sale, SaleCreate};
use crate::sale_actor::SaleError;
use crate::actor_framework::ResourceClient;

/// Client for the append-only sales ledger.
#[derive(Clone)]
pub struct SaleClient {
    inner: ResourceClient<Sale>,
}

impl_basic_client!(SaleClient, Sale, SaleError, sale);

impl SaleClient {
    #[instrument(skip(self, sale), fields(checkout_id = %sale.checkout_id, total = %sale.total))]
    pub async fn record_sale(&self, sale: SaleCreate) -> Result<String, SaleError> {
        debug!("Sending request");
        let id = self.inner.create(sale).await?;
        info!(sale_id = %id, "Sale recorded");
        Ok(id)
    }
}
