use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use super::error::{PipelineError, Stage};

/// Shared cancellation signal, checked between stages.
///
/// Setting it never interrupts a running stage; the pipeline stops at the
/// next stage boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fails with [`PipelineError::Cancelled`] if cancellation was requested
    /// before `next` starts.
    pub(crate) fn checkpoint(&self, next: Stage) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            info!(stage = %next, "cancellation requested; stopping before stage");
            return Err(PipelineError::Cancelled { stage: next });
        }
        Ok(())
    }
}
