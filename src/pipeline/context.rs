//! Shared state for one run: the live depth bound plus two advisory flags.
//!
//! Exactly one context exists per run. The walk thread reads it at every descent
//! decision; the timer thread writes the depth bound through [`TraversalContext::set_max_depth`].

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

#[derive(Debug)]
pub struct TraversalContext {
    max_depth: AtomicI64,
    timeout_occurred: AtomicBool,
    has_result: AtomicBool,
}

impl TraversalContext {
    pub fn new(max_depth: i64) -> Self {
        Self {
            max_depth: AtomicI64::new(max_depth),
            timeout_occurred: AtomicBool::new(false),
            has_result: AtomicBool::new(false),
        }
    }

    /// Correction path only.
    pub fn set_max_depth(&self, n: i64) {
        self.max_depth.store(n, Ordering::SeqCst);
    }

    pub fn max_depth(&self) -> i64 {
        self.max_depth.load(Ordering::SeqCst)
    }

    /// Whether a directory at `depth` may have its subdirectories entered.
    /// Reads the live bound; never cache the result across decisions.
    pub fn may_descend(&self, depth: i64) -> bool {
        let max = self.max_depth();
        max < 0 || depth < max
    }

    pub fn timeout_occurred(&self) -> bool {
        self.timeout_occurred.load(Ordering::Relaxed)
    }

    pub fn has_result(&self) -> bool {
        self.has_result.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_timeout(&self) {
        self.timeout_occurred.store(true, Ordering::Relaxed);
    }

    pub(crate) fn mark_result(&self) {
        self.has_result.store(true, Ordering::Relaxed);
    }
}

impl Default for TraversalContext {
    fn default() -> Self {
        Self::new(-1)
    }
}
