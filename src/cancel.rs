//! Cooperative cancellation
//!
//! Stages check the token between frames, never mid-frame, and bail out with
//! [`AutotuneError::Cancelled`](crate::AutotuneError::Cancelled).

use crate::error::AutotuneError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag
///
/// Clones share the same flag, so a token handed to a worker can be cancelled
/// from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation was requested
    pub fn check(&self) -> Result<(), AutotuneError> {
        if self.is_cancelled() {
            Err(AutotuneError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Check an optional token
pub(crate) fn check(token: Option<&CancellationToken>) -> Result<(), AutotuneError> {
    token.map_or(Ok(()), CancellationToken::check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let worker = token.clone();
        assert!(worker.check().is_ok());

        token.cancel();
        assert!(worker.is_cancelled());
        assert_eq!(worker.check(), Err(AutotuneError::Cancelled));
        assert_eq!(check(Some(&worker)), Err(AutotuneError::Cancelled));
        assert!(check(None).is_ok());
    }
}
