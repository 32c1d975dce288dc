use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Cooperative stop signal shared by every job in a batch.
///
/// Jobs poll it between pipeline stages; a stage already running is never
/// interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    inner: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` once the flag has been raised.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ConversionError::Cancelled)
        } else {
            Ok(())
        }
    }
}
