//! Logging setup for the command-line tool
//!
//! Everything goes to stderr so stdout stays machine-readable. `RUST_LOG`
//! takes precedence over the default filter.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Default log level filter
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            include_location: false,
            default_filter: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Configuration from the global command-line flags
    pub fn from_flags(verbose: bool, json: bool) -> Self {
        let default_filter = if verbose {
            "info,planlens_cli=debug,planlens_analyzer=debug,planlens_settings=debug"
        } else {
            "warn"
        };
        Self {
            json,
            include_location: verbose,
            default_filter: default_filter.to_string(),
        }
    }
}

/// Installs the global subscriber
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let layer = if config.json {
        fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_ansi(false)
            .json()
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(config.include_location)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).try_init()?;

    tracing::debug!(
        json = config.json,
        filter = %config.default_filter,
        "logging initialized"
    );
    Ok(())
}
