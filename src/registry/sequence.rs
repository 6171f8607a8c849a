use std::sync::atomic::{AtomicU64, Ordering};

use super::RecordId;

/// Monotonic id allocator shared by every writer of a [`Registry`].
///
/// The counter holds the last id handed out, so the first call to
/// [`IdSequence::next`] returns 1.
///
/// [`Registry`]: super::Registry
#[derive(Debug, Default)]
pub struct IdSequence {
    last: AtomicU64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id. Never returns the same value twice.
    pub fn next(&self) -> RecordId {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Make sure every id up to and including `id` is considered taken.
    pub fn advance_past(&self, id: RecordId) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }

    /// The most recently allocated id, 0 before the first allocation.
    pub fn current(&self) -> RecordId {
        self.last.load(Ordering::SeqCst)
    }
}
