use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{FlightError, FlightResult};

/// Shared cancellation flag threaded through the frame loop and the encode engine.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Return `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return [`FlightError::Cancelled`] when cancellation was requested.
    pub fn check(&self) -> FlightResult<()> {
        if self.is_cancelled() {
            return Err(FlightError::Cancelled);
        }
        Ok(())
    }
}
