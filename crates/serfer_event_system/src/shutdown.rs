//! Shutdown coordination for the dispatch loop.
//!
//! [`ShutdownState`] is a level-triggered, single-shot cancellation signal.
//! Once initiated it stays initiated. States form a tree: a child created with
//! [`ShutdownState::child`] is cancelled whenever its parent is, but cancelling
//! a child leaves the parent untouched.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shared shutdown signal for coordinating graceful shutdown across components.
#[derive(Debug, Clone, Default)]
pub struct ShutdownState {
    token: CancellationToken,
}

impl ShutdownState {
    /// Creates a new, not yet initiated shutdown state.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Creates a state that is initiated whenever `self` is.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Initiates shutdown. Calling it again has no further effect.
    pub fn initiate_shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("🛑 Shutdown initiated - no new events will be dispatched");
        }
        self.token.cancel();
    }

    /// Waits until shutdown has been initiated, returning immediately if it
    /// already has been.
    pub async fn initiated(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_is_level_triggered() {
        let state = ShutdownState::new();
        assert!(!state.is_shutdown_initiated());

        state.initiate_shutdown();
        state.initiate_shutdown();
        assert!(state.is_shutdown_initiated());

        // Observing it repeatedly never blocks
        state.initiated().await;
        state.initiated().await;
    }

    #[tokio::test]
    async fn test_parent_cancels_child() {
        let parent = ShutdownState::new();
        let child = parent.child();

        parent.initiate_shutdown();
        tokio::time::timeout(Duration::from_secs(1), child.initiated())
            .await
            .expect("child should observe parent shutdown");
        assert!(child.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_child_does_not_cancel_parent() {
        let parent = ShutdownState::new();
        let child = parent.child();

        child.initiate_shutdown();
        assert!(child.is_shutdown_initiated());
        assert!(!parent.is_shutdown_initiated());
    }
}
