//! Cooperative cancellation flag shared between the front end and the
//! active worker.
//!
//! The flag is polled at step boundaries inside command handlers; setting it
//! does not interrupt an in-flight blocking call, it only prevents the next
//! step from starting. The speech wait loop additionally polls it so playback
//! can be cut short.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable stop flag. All clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Creates a new, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the active command stop at its next step boundary.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so the next command can run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Returns true once a stop has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn starts_unset() {
        assert!(!StopFlag::new().is_requested());
    }

    #[test]
    fn request_and_reset() {
        let flag = StopFlag::new();
        flag.request();
        assert!(flag.is_requested());
        flag.reset();
        assert!(!flag.is_requested());
    }

    #[test]
    fn clones_share_state() {
        let flag = StopFlag::new();
        let observer = flag.clone();
        flag.request();
        assert!(observer.is_requested());
    }
}
