use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Progress tracking for a curve build, shareable across threads
#[derive(Debug, Clone)]
pub struct CurveProgress {
    /// Bins finished, determined or not
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl CurveProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create from existing atomics, e.g. ones owned by a front-end
    pub fn from_atomics(
        completed: Arc<AtomicUsize>,
        total: Arc<AtomicUsize>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            completed,
            total,
            cancelled,
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Request cancellation; bins already running finish normally
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for CurveProgress {
    fn default() -> Self {
        Self::new(0)
    }
}
