//! Logging initialization for applications embedding the toolkit.
//!
//! Writes to stderr so host programs keep stdout for their own output,
//! and honors `RUST_LOG` over any programmatic level. The library itself
//! never installs a subscriber; call [`init_logging`] once at startup.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The maximum level to emit. Default: INFO.
    pub level: Level,
    /// Whether to include timestamps. Default: true.
    pub with_timestamps: bool,
    /// Whether to include the emitting module path. Default: true.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_timestamps: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum level to emit.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets whether timestamps are included.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.with_timestamps = enabled;
        self
    }

    /// Sets whether the emitting module path is included.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }
}

/// Installs a stderr tracing subscriber with the given configuration.
///
/// `RUST_LOG`, when set, overrides the configured level. Call once at
/// application startup; a second call panics because a global subscriber
/// is already installed.
pub fn init_logging(config: LoggingConfig) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        // Level display form ("INFO") parses as a filter directive.
        EnvFilter::new(config.level.to_string())
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(config.with_target);

    if config.with_timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}

/// Installs the subscriber with default configuration.
pub fn init_default_logging() {
    init_logging(LoggingConfig::default());
}
