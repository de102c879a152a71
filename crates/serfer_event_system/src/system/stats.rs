/// Dispatch loop statistics
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time counters for a dispatch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Events taken off the queue
    pub events_received: u64,
    /// Dispatch tasks that ran to completion
    pub events_dispatched: u64,
}

impl DispatchStats {
    /// Dispatch tasks that were started but have not completed. This includes
    /// handlers that are still running and handlers that panicked.
    pub fn in_flight(&self) -> u64 {
        self.events_received.saturating_sub(self.events_dispatched)
    }
}

/// Lock-free counters shared between the loop and its dispatch tasks.
#[derive(Debug, Default)]
pub(super) struct StatsCounters {
    events_received: AtomicU64,
    events_dispatched: AtomicU64,
}

impl StatsCounters {
    pub(super) fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_dispatched(&self) {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
        }
    }
}
