use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{DocsynthError, Result};

/// Cooperative cancellation shared between the engine and whoever may stop it
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with `Cancelled` once the flag has been tripped
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DocsynthError::Cancelled)
        } else {
            Ok(())
        }
    }
}
