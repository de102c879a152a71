//! Main application logic and lifecycle management.
//!
//! The `Application` wires an event source, the dispatch loop and the logging
//! consumers together, then runs until input ends or a termination signal
//! arrives.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    consumers::logging_registry,
    feed::{feed_events, FeedSummary},
    logging::display_banner,
    signals::setup_signal_handlers,
};
use serfer_event_system::{DispatchLoop, DispatchStats, EventRouter, ShutdownState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Outcome of one application run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// What the input feed did
    pub feed: FeedSummary,
    /// Dispatch loop counters at shutdown
    pub dispatch: DispatchStats,
    /// Whether the run ended because of a termination signal
    pub interrupted: bool,
}

/// Main application struct.
pub struct Application {
    /// Loaded application configuration with CLI overrides applied
    config: AppConfig,
    /// Event input file, stdin when `None`
    events_path: Option<PathBuf>,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(service_prefix) = args.service_prefix {
            config.dispatcher.service_prefix = service_prefix;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        Ok(Self {
            config,
            events_path: args.events_path,
        })
    }

    #[cfg(test)]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the dispatcher until input ends or a shutdown signal arrives.
    ///
    /// When input ends normally the queue is drained, bounded by
    /// `dispatcher.drain_timeout_ms`, before the loop is stopped. On a signal
    /// the loop stops right away and queued events are dropped.
    pub async fn run(self) -> Result<RunSummary, Box<dyn std::error::Error>> {
        display_banner(&self.config.dispatcher.service_prefix);

        let reader = self.open_input().await?;
        let shutdown_state = ShutdownState::new();

        let signal_state = shutdown_state.clone();
        let signal_task = tokio::spawn(async move {
            if let Err(e) = setup_signal_handlers(&signal_state).await {
                error!("❌ Signal handling failed: {}", e);
            }
        });

        let (sender, receiver) = mpsc::channel(self.config.dispatcher.queue_capacity);
        let router = EventRouter::new(logging_registry(&self.config.dispatcher.service_prefix));
        let dispatcher = DispatchLoop::with_shutdown(receiver, Arc::new(router), &shutdown_state);
        dispatcher.start()?;

        let feed = feed_events(reader, sender, &shutdown_state).await?;
        let interrupted = shutdown_state.is_shutdown_initiated();

        if !interrupted {
            info!(
                "📄 Input finished: {} events queued, {} lines skipped",
                feed.sent, feed.skipped
            );
            let drain_timeout = Duration::from_millis(self.config.dispatcher.drain_timeout_ms);
            drain(&dispatcher, feed.sent, drain_timeout, &shutdown_state).await;
        }

        dispatcher.stop().await?;
        signal_task.abort();

        let dispatch = dispatcher.stats();
        info!(
            "📊 Dispatched {}/{} events ({} still in flight)",
            dispatch.events_dispatched,
            dispatch.events_received,
            dispatch.in_flight()
        );

        Ok(RunSummary {
            feed,
            dispatch,
            interrupted,
        })
    }

    async fn open_input(&self) -> std::io::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
        match &self.events_path {
            Some(path) => {
                info!("📂 Reading events from {}", path.display());
                let file = tokio::fs::File::open(path).await?;
                Ok(Box::new(BufReader::new(file)))
            }
            None => {
                info!("⌨️ Reading events from stdin");
                Ok(Box::new(BufReader::new(tokio::io::stdin())))
            }
        }
    }
}

/// Waits until every queued event has been taken off the queue and handled,
/// giving up after `timeout` or on shutdown.
async fn drain(
    dispatcher: &DispatchLoop,
    expected: u64,
    timeout: Duration,
    shutdown_state: &ShutdownState,
) {
    let settled = async {
        loop {
            let stats = dispatcher.stats();
            if stats.events_received >= expected && stats.in_flight() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };

    tokio::select! {
        _ = shutdown_state.initiated() => {}
        result = tokio::time::timeout(timeout, settled) => {
            if result.is_err() {
                warn!("⏱️ Drain timed out after {:?} - remaining events will be dropped", timeout);
            }
        }
    }
}
