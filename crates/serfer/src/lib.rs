//! # Serfer - Main Entry Point
//!
//! Host application for the serfer event system. It reads cluster events as
//! JSON lines, dispatches them through the event router and logs every
//! delivery.
//!
//! ## Quick Start
//!
//! ```bash
//! # Dispatch events piped in on stdin
//! gossip-export | serfer
//!
//! # Read events from a file with a custom service prefix
//! serfer --events events.jsonl --prefix billing
//!
//! # JSON logging for production
//! serfer --config production.toml --json-logs
//! ```
//!
//! ## Configuration
//!
//! Configuration is loaded from a TOML file (default: `config.toml`). If the
//! file doesn't exist, a default configuration is written.
//!
//! ## Signal Handling
//!
//! SIGINT and SIGTERM (Ctrl+C on Windows) stop the dispatcher immediately.
//! Events still queued at that point are dropped.

use tracing::error;

mod app;
mod cli;
mod config;
mod consumers;
mod feed;
mod logging;
mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Runs the complete application lifecycle: argument parsing, configuration,
/// logging, dispatch and shutdown.
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();

    let mut logging = config.logging.clone();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }
    if let Err(e) = logging::setup_logging(&logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

// Re-export main types for potential library usage
pub use app::RunSummary;
pub use config::{DispatcherSettings, LoggingSettings};
pub use consumers::{logging_registry, LoggingConsumer};
pub use feed::{feed_events, parse_event_line, FeedSummary};
