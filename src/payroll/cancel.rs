//! Cooperative cancellation of run processing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EngineError, EngineResult};

/// A cloneable flag a caller sets to abandon a run before it is persisted.
///
/// The engine checks the token after loading inputs and again right before
/// saving, never while employees are being calculated.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with `Cancelled` naming `stage` if cancellation was requested.
    pub fn check(&self, stage: &str) -> EngineResult<()> {
        if self.is_cancelled() {
            return Err(EngineError::Cancelled {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }
}
