//! Typed clients over the resource actors, plus the checkout orchestrator.

#[macro_use]
mod macros;
pub mod product_client;
pub mod sale_client;
pub mod checkout_client;

pub use product_client::*;
pub use sale_client::*;
pub use checkout_client::*;
