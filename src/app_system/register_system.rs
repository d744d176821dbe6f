use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};
use crate::actor_framework::{Ready, ResourceActor};
use crate::app_system::SystemError;
use crate::clients::{CheckoutClient, ProductClient, Recovery, SaleClient};
use crate::config::RegisterConfig;
use crate::domain::{Product, Sale};
use crate::ids::{sequential_ids, timestamp_ids};
use crate::journal::CheckoutJournal;
use crate::receipt::{DirectoryPrinter, ReceiptPrinter, StdoutPrinter};

/// The running register: both store actors plus the clients wired to them.
///
/// Responsible for starting the actors, waiting until they are ready,
/// resolving any checkout left unfinished by a previous run, and shutdown.
pub struct RegisterSystem {
    pub product_client: ProductClient,
    pub sale_client: SaleClient,
    pub checkout_client: CheckoutClient,
    /// What startup recovery found in the checkout journal.
    pub recovery: Recovery,
    handles: Vec<JoinHandle<()>>,
}

impl RegisterSystem {
    /// Starts the register with the printer named by the config.
    pub async fn start(config: &RegisterConfig) -> Result<Self, SystemError> {
        let printer: Arc<dyn ReceiptPrinter> = match &config.receipt_dir {
            Some(dir) => Arc::new(DirectoryPrinter::new(dir)),
            None => Arc::new(StdoutPrinter),
        };
        Self::start_with_printer(config, printer).await
    }

    /// **Startup Order:**
    /// 1. Spawn the products and sales actors
    /// 2. Await each readiness signal (snapshots loaded)
    /// 3. Open the checkout journal and wire the checkout client
    /// 4. Run journal recovery before handing out any client
    #[instrument(name = "register_system", skip_all)]
    pub async fn start_with_printer(
        config: &RegisterConfig,
        printer: Arc<dyn ReceiptPrinter>,
    ) -> Result<Self, SystemError> {
        let data_dir = config.resolved_data_dir();
        match &data_dir {
            Some(dir) => info!(data_dir = %dir.display(), "Starting register"),
            None => info!("Starting register in memory"),
        }

        let (product_actor, product_inner) =
            ResourceActor::<Product>::new(config.channel_buffer, sequential_ids("product"));
        let (product_handle, product_ready) = with_snapshots(product_actor, &data_dir).spawn();

        let (sale_actor, sale_inner) =
            ResourceActor::<Sale>::new(config.channel_buffer, timestamp_ids());
        let (sale_handle, sale_ready) = with_snapshots(sale_actor, &data_dir).spawn();

        let products = await_ready("products", product_ready).await?;
        let sales = await_ready("sales", sale_ready).await?;
        info!(products, sales, "Stores ready");

        let journal = match &data_dir {
            Some(dir) => CheckoutJournal::open(dir).await?,
            None => CheckoutJournal::in_memory(),
        };

        let product_client = ProductClient::new(product_inner);
        let sale_client = SaleClient::new(sale_inner);
        let checkout_client = CheckoutClient::new(
            product_client.clone(),
            sale_client.clone(),
            journal,
            printer,
            config.store_name.clone(),
        );

        let recovery = checkout_client.recover().await?;

        info!("Register started successfully");
        Ok(Self {
            product_client,
            sale_client,
            checkout_client,
            recovery,
            handles: vec![product_handle, sale_handle],
        })
    }

    /// Dropping every client closes the actor channels; each actor then
    /// finishes its loop and the task is joined.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down register");
        let Self { product_client, sale_client, checkout_client, handles, .. } = self;
        drop(checkout_client);
        drop(product_client);
        drop(sale_client);

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(SystemError::Shutdown(e.to_string()));
            }
        }

        info!("Register shutdown complete");
        Ok(())
    }
}

fn with_snapshots<T: crate::actor_framework::Entity>(
    actor: ResourceActor<T>,
    data_dir: &Option<PathBuf>,
) -> ResourceActor<T> {
    match data_dir {
        Some(dir) => actor.with_snapshot_dir(dir),
        None => actor,
    }
}

async fn await_ready(collection: &'static str, ready: Ready) -> Result<usize, SystemError> {
    match ready.await {
        Ok(Ok(count)) => Ok(count),
        Ok(Err(source)) => Err(SystemError::StoreStartup { collection, source }),
        Err(_) => Err(SystemError::StoreExited(collection)),
    }
}
