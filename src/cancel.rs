use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Search-wide stop flag
///
/// The coordinator is the only writer and raises it at most once. Workers only read it, at their
/// own check points, so a worker may keep scanning for up to one check interval after the flag is
/// raised.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Returns true only for the call that actually raised it.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::Release)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
