//! The sales ledger collection. Sales are append-only.

pub mod entity;
pub mod error;

pub use error::*;
