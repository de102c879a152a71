/// Dispatch system module - routing, the background loop and its statistics
mod dispatch;
mod router;
mod stats;

pub use dispatch::{DispatchLoop, LoopState};
pub use router::EventRouter;
pub use stats::DispatchStats;

use crate::events::Event;
use crate::handlers::HandlerRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Helper function wiring a registry, a router and a loop around a fresh
/// bounded queue.
///
/// Returns the producer side of the queue together with the (not yet
/// started) loop.
pub fn create_dispatcher(
    registry: HandlerRegistry,
    queue_capacity: usize,
) -> (mpsc::Sender<Event>, DispatchLoop) {
    let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
    let router = Arc::new(EventRouter::new(registry));
    (sender, DispatchLoop::new(receiver, router))
}
