// Suspension of the HTML fixes while a copy or cut is in flight.
//
// A counter rather than a flag: a copy that triggers another copy (nested
// synchronous clipboard events) keeps normalization off until the outermost
// one finishes, and every exit path releases through `Drop`.

use lazy_static::lazy_static;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

lazy_static! {
    static ref SHARED_GATE: NormalizationGate = NormalizationGate::new();
}

/// Handle to a suspension counter. Clones observe the same counter.
#[derive(Clone, Debug, Default)]
pub struct NormalizationGate {
    depth: Arc<AtomicUsize>,
}

impl NormalizationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gate every editor instance in the process shares.
    pub fn shared() -> Self {
        SHARED_GATE.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.depth() == 0
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Turns normalization off until the returned guard is dropped.
    pub fn suspend(&self) -> Suspension {
        self.depth.fetch_add(1, Ordering::SeqCst);
        Suspension {
            depth: Arc::clone(&self.depth),
        }
    }

    pub fn run_suspended<R>(&self, f: impl FnOnce() -> R) -> R {
        let _suspension = self.suspend();
        f()
    }

    /// Leaks a suspension for hosts that cannot hold the guard; pair with `release`.
    pub fn acquire(&self) -> usize {
        self.depth.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Undoes one `acquire`. Releasing an idle gate does nothing.
    pub fn release(&self) -> usize {
        release_one(&self.depth)
    }

    pub fn same_gate(&self, other: &NormalizationGate) -> bool {
        Arc::ptr_eq(&self.depth, &other.depth)
    }
}

#[must_use = "normalization resumes as soon as the suspension is dropped"]
#[derive(Debug)]
pub struct Suspension {
    depth: Arc<AtomicUsize>,
}

impl Drop for Suspension {
    fn drop(&mut self) {
        release_one(&self.depth);
    }
}

/// Decrements without going below zero, so an unbalanced `release` cannot
/// wrap the counter and leave normalization off for good.
fn release_one(depth: &AtomicUsize) -> usize {
    match depth.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1)) {
        Ok(previous) => previous - 1,
        Err(_) => 0,
    }
}
