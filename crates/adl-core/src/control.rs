//! Cooperative cancellation for jobs.
//!
//! Each job owns one flag. An API caller (cancel endpoint, CLI Ctrl-C) sets
//! it; the downloader checks it before admitting another fetch and the
//! pipeline checks it before finalizing. Nothing is interrupted preemptively.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Cloning shares the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
