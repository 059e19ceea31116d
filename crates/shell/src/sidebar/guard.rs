use std::sync::atomic::{AtomicBool, Ordering};

/// Reentrancy lock for session creation. Duplicate requests are dropped, never queued.
#[derive(Debug, Default)]
pub struct CreationGuard {
    in_progress: AtomicBool,
}

impl CreationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lock, or `None` when a creation is already in flight.
    ///
    /// The flag flips in one compare-exchange, before any await point of the caller.
    pub fn try_acquire(&self) -> Option<CreationPermit<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CreationPermit { guard: self })
    }

    pub fn is_held(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of one creation; dropping it releases the guard on every path.
#[derive(Debug)]
#[must_use = "the creation guard is released as soon as the permit is dropped"]
pub struct CreationPermit<'a> {
    guard: &'a CreationGuard,
}

impl Drop for CreationPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.store(false, Ordering::Release);
        tracing::trace!("creation guard released");
    }
}
