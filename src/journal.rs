//! Write-ahead intent log for checkout.
//!
//! A checkout touches two collections. Before the first stock decrement the
//! checkout writes an [`Intent`] here, and each decrement is appended to it
//! before it is sent to the products store. The intent is cleared once the
//! sale is recorded or the decrements have been released. An intent found at
//! startup therefore means the process stopped mid-checkout; its last entry
//! may or may not have reached the products store.

use std::path::PathBuf;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub const JOURNAL_FILE: &str = "checkout.journal.json";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JournalError {
    #[error("A checkout is already in progress: {0}")]
    Busy(Uuid),
    #[error("No checkout in progress")]
    Idle,
    #[error("Journal I/O error: {0}")]
    Io(String),
    #[error("Journal is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDecrement {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub checkout_id: Uuid,
    /// Decrements issued to the products store, in order. The last one may
    /// not have landed.
    pub issued: Vec<StockDecrement>,
}

/// Shared handle to the journal. Clones see the same state.
#[derive(Clone, Debug)]
pub struct CheckoutJournal {
    path: Option<PathBuf>,
    current: Arc<Mutex<Option<Intent>>>,
}

impl CheckoutJournal {
    /// Journal kept only in memory; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self { path: None, current: Arc::new(Mutex::new(None)) }
    }

    /// Opens (or starts) the journal file in `dir`, loading a pending intent.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = dir.into().join(JOURNAL_FILE);
        let current = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(
                serde_json::from_slice::<Intent>(&bytes)
                    .map_err(|e| JournalError::Corrupt(format!("{}: {}", path.display(), e)))?,
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(JournalError::Io(format!("{}: {}", path.display(), e))),
        };
        Ok(Self { path: Some(path), current: Arc::new(Mutex::new(current)) })
    }

    pub async fn pending(&self) -> Option<Intent> {
        self.current.lock().await.clone()
    }

    pub async fn begin(&self, checkout_id: Uuid) -> Result<(), JournalError> {
        let mut current = self.current.lock().await;
        if let Some(intent) = current.as_ref() {
            return Err(JournalError::Busy(intent.checkout_id));
        }
        let intent = Intent { checkout_id, issued: Vec::new() };
        self.write(Some(&intent)).await?;
        *current = Some(intent);
        debug!(%checkout_id, "Checkout intent written");
        Ok(())
    }

    /// Appends a decrement. Call before the decrement is sent.
    pub async fn record(&self, product_id: &str, quantity: u32) -> Result<(), JournalError> {
        let mut current = self.current.lock().await;
        let Some(intent) = current.as_mut() else {
            return Err(JournalError::Idle);
        };
        intent.issued.push(StockDecrement { product_id: product_id.to_string(), quantity });
        self.write(Some(&*intent)).await
    }

    /// Ends the current intent. The in-memory state is cleared even when the
    /// file cannot be removed; a stale file is resolved by recovery.
    pub async fn clear(&self) -> Result<(), JournalError> {
        let mut current = self.current.lock().await;
        *current = None;
        self.write(None).await
    }

    async fn write(&self, intent: Option<&Intent>) -> Result<(), JournalError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |e: std::io::Error| JournalError::Io(format!("{}: {}", path.display(), e));
        match intent {
            Some(intent) => {
                let json = serde_json::to_vec(intent).map_err(|e| JournalError::Io(e.to_string()))?;
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
                }
                let tmp = path.with_extension("json.tmp");
                tokio::fs::write(&tmp, json).await.map_err(io_err)?;
                tokio::fs::rename(&tmp, path).await.map_err(io_err)
            }
            None => match tokio::fs::remove_file(path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_err(e)),
                _ => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_intent_lifecycle_in_memory() {
        let journal = CheckoutJournal::in_memory();
        let id = Uuid::new_v4();

        assert_eq!(journal.record("p1", 1).await, Err(JournalError::Idle));
        journal.begin(id).await.unwrap();
        assert_eq!(journal.begin(Uuid::new_v4()).await, Err(JournalError::Busy(id)));

        journal.record("p1", 2).await.unwrap();
        journal.record("p2", 1).await.unwrap();
        let pending = journal.pending().await.unwrap();
        assert_eq!(pending.checkout_id, id);
        assert_eq!(
            pending.issued,
            vec![
                StockDecrement { product_id: "p1".into(), quantity: 2 },
                StockDecrement { product_id: "p2".into(), quantity: 1 },
            ]
        );

        journal.clear().await.unwrap();
        assert!(journal.pending().await.is_none());
    }

    #[tokio::test]
    async fn test_pending_intent_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        {
            let journal = CheckoutJournal::open(dir.path()).await.unwrap();
            journal.begin(id).await.unwrap();
            journal.record("p7", 3).await.unwrap();
        }

        let reopened = CheckoutJournal::open(dir.path()).await.unwrap();
        let pending = reopened.pending().await.unwrap();
        assert_eq!(pending.checkout_id, id);
        assert_eq!(pending.issued.len(), 1);

        reopened.clear().await.unwrap();
        assert!(!dir.path().join(JOURNAL_FILE).exists());
        assert!(CheckoutJournal::open(dir.path()).await.unwrap().pending().await.is_none());
    }
}
