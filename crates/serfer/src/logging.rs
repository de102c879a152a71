//! Logging system setup and configuration.
//!
//! This module handles the initialization of the tracing-based logging system
//! with support for both human-readable and JSON output formats.

use crate::config::LoggingSettings;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system with the specified configuration.
///
/// `RUST_LOG` takes precedence over the configured level when set.
/// `json_format` forces JSON output regardless of the config file.
pub fn setup_logging(
    config: &LoggingSettings,
    json_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json = json_format || config.json_format;
    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_ansi(!json);

    // `json()` changes the layer type, so each arm finishes its own subscriber
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(layer.json()).try_init()?;
    } else {
        registry.with(layer).try_init()?;
    }

    info!(
        "🔧 Logging initialized (level: {}, format: {})",
        config.level,
        if json { "json" } else { "text" }
    );
    Ok(())
}

/// Logs the startup banner.
pub fn display_banner(service_prefix: &str) {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║              📡 SERFER 📡                ║");
    info!("║     Membership Event Dispatcher v{}   ║", version);
    info!("╚══════════════════════════════════════════╝");
    info!("🏷️ Service prefix: '{}:'", service_prefix);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_setup_is_an_error_not_a_panic() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            json_format: true,
        };

        // The first call may or may not win the global subscriber slot
        let _ = setup_logging(&settings, false);
        assert!(setup_logging(&settings, false).is_err());
        assert!(setup_logging(&settings, true).is_err());
    }
}
