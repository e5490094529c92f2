//! Cross-cycle shared state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::fanout::SubscriberRegistry;
use crate::snapshot::Snapshot;

/// State shared between cycles, the push server and readers
///
/// Holds the current snapshot, the single in-flight guard and the
/// subscriber registry. No lock is held across an `.await`.
#[derive(Debug)]
pub struct MonitorContext {
    current: RwLock<Arc<Snapshot>>,
    in_flight: AtomicBool,
    subscribers: Arc<SubscriberRegistry>,
}

impl MonitorContext {
    /// Creates a context serving `initial` until the first cycle ends
    #[must_use]
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            in_flight: AtomicBool::new(false),
            subscribers: Arc::new(SubscriberRegistry::new()),
        }
    }

    /// The latest snapshot, for a first paint
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swaps in a new snapshot as a whole
    pub fn replace_snapshot(&self, snapshot: Arc<Snapshot>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot;
    }

    /// Marks a cycle as running, or returns `None` if one already is
    ///
    /// The mark is cleared when the returned guard is dropped.
    #[must_use]
    pub fn try_begin_cycle(&self) -> Option<CycleGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard { context: self })
    }

    /// Returns true while a cycle runs
    #[must_use]
    pub fn is_cycle_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Subscribers receiving every new snapshot
    #[must_use]
    pub fn subscribers(&self) -> &Arc<SubscriberRegistry> {
        &self.subscribers
    }
}

/// Clears the in-flight mark on drop, including during unwinding
#[derive(Debug)]
pub struct CycleGuard<'a> {
    context: &'a MonitorContext,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.context.in_flight.store(false, Ordering::Release);
    }
}
