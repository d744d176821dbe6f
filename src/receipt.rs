//! Plain-text receipts and the printers they are handed to.

use std::fmt::Write as _;
use std::path::PathBuf;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;
use tracing::{debug, instrument};
use crate::domain::Sale;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PrintError {
    #[error("Printer unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to write receipt: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub sale_id: String,
    pub text: String,
}

impl Receipt {
    /// Renders in the viewer's local time.
    pub fn render(store_name: &str, sale: &Sale) -> Self {
        Self::render_in(store_name, sale, &Local)
    }

    pub fn render_in<Tz: TimeZone>(store_name: &str, sale: &Sale, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let date: DateTime<Tz> = sale.date.with_timezone(tz);
        let mut text = String::new();
        let _ = writeln!(text, "{} Receipt", store_name);
        let _ = writeln!(text);
        let _ = writeln!(text, "Date: {}", date.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(text);
        let _ = writeln!(text, "Items:");
        for item in &sale.items {
            let _ = writeln!(text, "{} x{} - {}", item.name, item.quantity, item.subtotal());
        }
        let _ = write!(text, "\nTotal: {}", sale.total);

        Self { sale_id: sale.id.clone(), text }
    }
}

/// Where receipts go once a sale is recorded.
#[async_trait]
pub trait ReceiptPrinter: Send + Sync {
    async fn print(&self, receipt: &Receipt) -> Result<(), PrintError>;
}

/// Writes receipts to standard output.
pub struct StdoutPrinter;

#[async_trait]
impl ReceiptPrinter for StdoutPrinter {
    async fn print(&self, receipt: &Receipt) -> Result<(), PrintError> {
        println!("{}", receipt.text);
        Ok(())
    }
}

/// Writes each receipt to `<dir>/receipt-<sale id>.txt`.
pub struct DirectoryPrinter {
    dir: PathBuf,
}

impl DirectoryPrinter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, sale_id: &str) -> PathBuf {
        self.dir.join(format!("receipt-{}.txt", sale_id))
    }
}

#[async_trait]
impl ReceiptPrinter for DirectoryPrinter {
    #[instrument(skip(self, receipt), fields(sale_id = %receipt.sale_id))]
    async fn print(&self, receipt: &Receipt) -> Result<(), PrintError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PrintError::Io(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.path_for(&receipt.sale_id);
        tokio::fs::write(&path, receipt.text.as_bytes())
            .await
            .map_err(|e| PrintError::Io(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Receipt written");
        Ok(())
    }
}
