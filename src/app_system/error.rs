use thiserror::Error;
use crate::actor_framework::FrameworkError;
use crate::clients::CheckoutError;
use crate::journal::JournalError;

/// Errors raised while starting or stopping the register.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("{collection} store failed to start: {source}")]
    StoreStartup {
        collection: &'static str,
        #[source]
        source: FrameworkError,
    },
    #[error("{0} store exited before signalling readiness")]
    StoreExited(&'static str),
    #[error("Checkout journal unavailable: {0}")]
    Journal(#[from] JournalError),
    #[error("Checkout recovery failed: {0}")]
    Recovery(#[from] CheckoutError),
    #[error("Actor task failed: {0}")]
    Shutdown(String),
}
