/// Background dispatch loop
use super::stats::{DispatchStats, StatsCounters};
use crate::error::DispatchError;
use crate::events::Event;
use crate::handlers::EventHandler;
use crate::shutdown::ShutdownState;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`DispatchLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    /// Bound to a queue and handler, not started yet
    Created = 0,
    /// Consuming events
    Running = 1,
    /// Cancellation requested, waiting for the loop to exit
    Stopping = 2,
    /// The loop has exited
    Stopped = 3,
}

impl LoopState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoopState::Created,
            1 => LoopState::Running,
            2 => LoopState::Stopping,
            _ => LoopState::Stopped,
        }
    }
}

/// Drains an event queue on a background task and hands every event to an
/// [`EventHandler`], normally an [`EventRouter`](crate::EventRouter).
///
/// Each dequeued event is dispatched on its own spawned task, so a slow
/// handler never holds up the queue. Events leave the queue in FIFO order but
/// their handlers may complete in any order.
///
/// # Lifecycle
///
/// `Created → Running → Stopping → Stopped`.
///
/// * [`start`](Self::start) may succeed once. Later calls return
///   [`DispatchError::AlreadyStarted`] or [`DispatchError::Stopped`].
/// * [`stop`](Self::stop) cancels the loop and waits for it to exit. It may be
///   called any number of times, concurrently or not; every call returns once
///   the loop is gone. Stopping a loop that never started simply marks it
///   stopped.
///
/// # Shutdown semantics
///
/// * Cancellation always wins over a ready queue, so once shutdown is observed
///   no further event is taken off the queue.
/// * Events still queued when the loop exits are dropped without notice.
///   Callers that cannot lose events must drain the queue before stopping.
/// * `stop` does not wait for handlers that are still running, and nothing
///   here times out or kills a handler that never returns.
/// * A handler that panics only takes down its own dispatch task.
///
/// # Examples
///
/// ```rust,no_run
/// use serfer_event_system::{DispatchLoop, EventRouter, HandlerRegistry};
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (tx, rx) = mpsc::channel(1024);
/// let router = EventRouter::new(HandlerRegistry::new("serfer"));
/// let dispatcher = DispatchLoop::new(rx, Arc::new(router));
///
/// dispatcher.start()?;
/// // producers send events through `tx` ...
/// # drop(tx);
/// dispatcher.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct DispatchLoop {
    handler: Arc<dyn EventHandler>,
    queue: Mutex<Option<mpsc::Receiver<Event>>>,
    shutdown: ShutdownState,
    state: Arc<AtomicU8>,
    stopped: Arc<watch::Sender<bool>>,
    stats: Arc<StatsCounters>,
    task: Mutex<Option<JoinHandle<()>>>,
    failure: Mutex<Option<String>>,
}

impl std::fmt::Debug for DispatchLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchLoop")
            .field("state", &self.state())
            .field("stats", &self.stats())
            .finish()
    }
}

impl DispatchLoop {
    /// Creates a loop bound to `queue` and `handler`. Nothing runs until
    /// [`start`](Self::start) is called.
    pub fn new(queue: mpsc::Receiver<Event>, handler: Arc<dyn EventHandler>) -> Self {
        Self::with_shutdown(queue, handler, &ShutdownState::new())
    }

    /// Creates a loop that also stops when `parent` initiates shutdown.
    ///
    /// Stopping the loop does not affect `parent`.
    pub fn with_shutdown(
        queue: mpsc::Receiver<Event>,
        handler: Arc<dyn EventHandler>,
        parent: &ShutdownState,
    ) -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            handler,
            queue: Mutex::new(Some(queue)),
            shutdown: parent.child(),
            state: Arc::new(AtomicU8::new(LoopState::Created as u8)),
            stopped: Arc::new(stopped),
            stats: Arc::new(StatsCounters::default()),
            task: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats.snapshot()
    }

    /// Spawns the consuming task on the current Tokio runtime.
    pub fn start(&self) -> Result<(), DispatchError> {
        let runtime = Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;

        if let Err(current) = self.state.compare_exchange(
            LoopState::Created as u8,
            LoopState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            let error = match LoopState::from_u8(current) {
                LoopState::Stopped => DispatchError::Stopped,
                _ => DispatchError::AlreadyStarted,
            };
            warn!("⚠️ Refusing to start dispatch loop: {}", error);
            return Err(error);
        }

        let Some(queue) = take_locked(&self.queue) else {
            return Err(DispatchError::AlreadyStarted);
        };

        let task = runtime.spawn(run_loop(
            queue,
            self.handler.clone(),
            self.shutdown.clone(),
            self.stats.clone(),
            self.state.clone(),
            self.stopped.clone(),
        ));
        put_locked(&self.task, task);

        info!("🚀 Dispatch loop started");
        Ok(())
    }

    /// Requests cancellation and waits until the loop task has exited.
    ///
    /// If the loop task itself panicked or was aborted, every call, including
    /// concurrent and later ones, returns [`DispatchError::LoopPanicked`].
    pub async fn stop(&self) -> Result<(), DispatchError> {
        if self
            .state
            .compare_exchange(
                LoopState::Created as u8,
                LoopState::Stopped as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            drop(take_locked(&self.queue));
            self.shutdown.initiate_shutdown();
            mark_stopped(&self.state, &self.stopped);
            info!("✅ Dispatch loop stopped before it was started");
            return Ok(());
        }

        let _ = self.state.compare_exchange(
            LoopState::Running as u8,
            LoopState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.shutdown.initiate_shutdown();

        match take_locked(&self.task) {
            Some(task) => {
                if let Err(e) = task.await {
                    error!("💥 Dispatch loop task failed: {}", e);
                    put_locked(&self.failure, e.to_string());
                }
                // Failure is recorded before waiters are released
                mark_stopped(&self.state, &self.stopped);
            }
            None => {
                // Another caller owns the task handle; wait for its signal
                let mut stopped = self.stopped.subscribe();
                let _ = stopped.wait_for(|stopped| *stopped).await;
            }
        }

        match peek_locked(&self.failure) {
            Some(reason) => Err(DispatchError::LoopPanicked(reason)),
            None => Ok(()),
        }
    }
}

impl Drop for DispatchLoop {
    fn drop(&mut self) {
        self.shutdown.initiate_shutdown();
    }
}

/// The consuming loop. Races cancellation against the queue until cancelled.
async fn run_loop(
    mut queue: mpsc::Receiver<Event>,
    handler: Arc<dyn EventHandler>,
    shutdown: ShutdownState,
    stats: Arc<StatsCounters>,
    state: Arc<AtomicU8>,
    stopped: Arc<watch::Sender<bool>>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.initiated() => break,

            received = queue.recv() => match received {
                Some(event) => {
                    stats.record_received();
                    debug!("📥 Dispatching {} event", event.event_type());

                    let handler = handler.clone();
                    let stats = stats.clone();
                    tokio::spawn(async move {
                        handler.handle_event(Some(event)).await;
                        stats.record_dispatched();
                    });
                }
                None => {
                    warn!("📭 Event queue closed by all producers - idling until shutdown");
                    shutdown.initiated().await;
                    break;
                }
            },
        }
    }

    // Anything still queued is dropped with the receiver
    drop(queue);
    mark_stopped(&state, &stopped);
    info!("✅ Dispatch loop stopped");
}

fn mark_stopped(state: &AtomicU8, stopped: &watch::Sender<bool>) {
    state.store(LoopState::Stopped as u8, Ordering::Release);
    stopped.send_replace(true);
}

fn take_locked<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

fn peek_locked<T: Clone>(slot: &Mutex<Option<T>>) -> Option<T> {
    match slot.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn put_locked<T>(slot: &Mutex<Option<T>>, value: T) {
    match slot.lock() {
        Ok(mut guard) => *guard = Some(value),
        Err(poisoned) => *poisoned.into_inner() = Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ChannelHandler;

    #[tokio::test]
    async fn test_failed_loop_task_is_reported_to_every_stop_caller() {
        let (handler, _delivered) = ChannelHandler::pair();
        let (_tx, rx) = mpsc::channel(4);
        let dispatcher = DispatchLoop::new(rx, handler);
        dispatcher.start().unwrap();

        if let Some(task) = dispatcher.task.lock().unwrap().as_ref() {
            task.abort();
        }

        let (first, second) = tokio::join!(dispatcher.stop(), dispatcher.stop());
        assert!(matches!(first, Err(DispatchError::LoopPanicked(_))));
        assert!(matches!(second, Err(DispatchError::LoopPanicked(_))));

        // Later calls see the same outcome
        assert!(matches!(
            dispatcher.stop().await,
            Err(DispatchError::LoopPanicked(_))
        ));
        assert_eq!(dispatcher.state(), LoopState::Stopped);
    }
}
