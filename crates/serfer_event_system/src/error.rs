//! Error types for the dispatch loop lifecycle.
//!
//! Routing itself never fails. These errors only describe misuse of the
//! loop's control surface.

/// Errors returned by [`DispatchLoop`](crate::DispatchLoop) control operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// `start` was called on a loop that is already running
    #[error("dispatch loop already started")]
    AlreadyStarted,

    /// `start` was called after the loop was stopped
    #[error("dispatch loop has been stopped and cannot be restarted")]
    Stopped,

    /// `start` was called outside of a Tokio runtime
    #[error("no Tokio runtime available to spawn the dispatch loop")]
    NoRuntime,

    /// The loop task itself panicked or was aborted
    #[error("dispatch loop task failed: {0}")]
    LoopPanicked(String),
}
