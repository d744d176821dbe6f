use std::sync::Arc;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use crate::clients::{ProductClient, SaleClient};
use crate::domain::{Cart, Sale, SaleCreate, SaleItem};
use crate::journal::{CheckoutJournal, JournalError, StockDecrement};
use crate::product_actor::ProductError;
use crate::receipt::{Receipt, ReceiptPrinter};
use crate::sale_actor::SaleError;

/// Errors that can occur while converting a cart into a sale.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Stock update failed: {0}")]
    Stock(#[from] ProductError),
    #[error("Recording the sale failed: {0}")]
    Ledger(#[from] SaleError),
    #[error("Checkout journal failed: {0}")]
    Journal(#[from] JournalError),
    #[error("Checkout {checkout_id} could not be rolled back: {source}. Restart the register to finish the rollback")]
    Compensation {
        checkout_id: Uuid,
        #[source]
        source: ProductError,
    },
}

/// A completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub sale: Sale,
    pub receipt: Receipt,
    /// False when the printer refused the receipt; the sale stands either way.
    pub printed: bool,
}

/// What startup recovery did with a checkout left in the journal.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    Clean,
    RolledForward { checkout_id: Uuid, sale_id: String },
    RolledBack { checkout_id: Uuid, restocked: Vec<StockDecrement> },
}

/// Checkout engine. Orchestrates the products and sales stores: validates
/// the cart, decrements stock line by line, records the sale, clears the
/// cart and prints the receipt.
///
/// After a [`CheckoutError::Compensation`] the intent stays in the journal,
/// and every later checkout fails with [`JournalError::Busy`] until
/// [`CheckoutClient::recover`] runs, which happens on the next startup.
#[derive(Clone)]
pub struct CheckoutClient {
    product_client: ProductClient,
    sale_client: SaleClient,
    journal: CheckoutJournal,
    printer: Arc<dyn ReceiptPrinter>,
    store_name: String,
}

impl CheckoutClient {
    pub fn new(
        product_client: ProductClient,
        sale_client: SaleClient,
        journal: CheckoutJournal,
        printer: Arc<dyn ReceiptPrinter>,
        store_name: impl Into<String>,
    ) -> Self {
        Self {
            product_client,
            sale_client,
            journal,
            printer,
            store_name: store_name.into(),
        }
    }

    #[instrument(skip(self, cart), fields(lines = cart.len(), checkout_id = tracing::field::Empty))]
    pub async fn checkout(&self, cart: &mut Cart) -> Result<CheckoutOutcome, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let checkout_id = Uuid::new_v4();
        tracing::Span::current().record("checkout_id", tracing::field::display(checkout_id));
        info!("Processing checkout");
        self.journal.begin(checkout_id).await?;

        // Step 1: Decrement stock, one line at a time. Each line is journaled
        // before it is sent.
        for line in cart.lines() {
            if let Err(e) = self.journal.record(&line.product_id, line.quantity).await {
                error!(error = %e, "Journal write failed");
                return Err(self.abort(checkout_id, e.into()).await);
            }
            let decrement = self.product_client.decrement_stock(line.product_id.clone(), checkout_id, line.quantity);
            if let Err(e) = decrement.await {
                error!(product_id = %line.product_id, error = %e, "Stock decrement failed");
                return Err(self.abort(checkout_id, e.into()).await);
            }
        }

        info!(lines = cart.len(), "Stock decremented");

        // Step 2: Record the sale
        let items: Vec<SaleItem> = cart.lines().iter().map(|line| line.to_sale_item()).collect();
        let payload = SaleCreate {
            checkout_id,
            date: Utc::now(),
            items,
            total: cart.total(),
        };
        let sale = Sale {
            id: String::new(),
            checkout_id,
            date: payload.date,
            items: payload.items.clone(),
            total: payload.total,
        };
        let sale_id = match self.sale_client.record_sale(payload).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Sale insert failed");
                return Err(self.abort(checkout_id, e.into()).await);
            }
        };
        let sale = Sale { id: sale_id, ..sale };

        if let Err(e) = self.journal.clear().await {
            // the sale exists, so recovery rolls this intent forward
            warn!(error = %e, "Could not clear checkout journal");
        }

        // Step 3: Clear the cart
        cart.clear();

        // Step 4: Print the receipt
        let receipt = Receipt::render(&self.store_name, &sale);
        let printed = match self.printer.print(&receipt).await {
            Ok(()) => true,
            Err(e) => {
                warn!(sale_id = %sale.id, error = %e, "Receipt printing failed");
                false
            }
        };

        info!(sale_id = %sale.id, total = %sale.total, "Checkout complete");
        Ok(CheckoutOutcome { sale, receipt, printed })
    }

    /// Resolves a checkout left in the journal by a previous run.
    ///
    /// If the sale was recorded the checkout is kept; otherwise whatever its
    /// stock decrements took is put back.
    #[instrument(skip(self))]
    pub async fn recover(&self) -> Result<Recovery, CheckoutError> {
        let Some(intent) = self.journal.pending().await else {
            return Ok(Recovery::Clean);
        };
        let checkout_id = intent.checkout_id;
        warn!(%checkout_id, issued = intent.issued.len(), "Found unfinished checkout");

        let sales = self.sale_client.list_sales().await?;
        if let Some(sale) = sales.into_iter().find(|sale| sale.checkout_id == checkout_id) {
            self.journal.clear().await?;
            info!(%checkout_id, sale_id = %sale.id, "Rolled forward");
            return Ok(Recovery::RolledForward { checkout_id, sale_id: sale.id });
        }

        let restocked = self.compensate(checkout_id, &intent.issued).await?;
        self.journal.clear().await?;
        info!(%checkout_id, restocked = restocked.len(), "Rolled back");
        Ok(Recovery::RolledBack { checkout_id, restocked })
    }

    /// Compensates and returns the error to report. The first failure is
    /// reported unless the compensation itself fails.
    async fn abort(&self, checkout_id: Uuid, cause: CheckoutError) -> CheckoutError {
        let issued = self.journal.pending().await.map(|intent| intent.issued).unwrap_or_default();
        if let Err(e) = self.compensate(checkout_id, &issued).await {
            return e;
        }
        if let Err(e) = self.journal.clear().await {
            warn!(error = %e, "Could not clear checkout journal");
        }
        cause
    }

    /// Releases every issued decrement, newest first. Releases are keyed by
    /// `checkout_id`, so entries that never landed or were already released
    /// are skipped. Returns the ones that restocked.
    async fn compensate(&self, checkout_id: Uuid, issued: &[StockDecrement]) -> Result<Vec<StockDecrement>, CheckoutError> {
        let mut restocked = Vec::new();
        for decrement in issued.iter().rev() {
            let product_id = decrement.product_id.clone();
            match self.product_client.release_stock(product_id, checkout_id, decrement.quantity).await {
                Ok(true) => restocked.push(decrement.clone()),
                Ok(false) => debug!(product_id = %decrement.product_id, "Nothing to release"),
                Err(ProductError::NotFound(_)) => {
                    warn!(product_id = %decrement.product_id, "Product is gone, nothing to release")
                }
                Err(source) => {
                    error!(%checkout_id, product_id = %decrement.product_id, error = %source, "Restock failed");
                    return Err(CheckoutError::Compensation { checkout_id, source });
                }
            }
        }
        Ok(restocked)
    }
}
