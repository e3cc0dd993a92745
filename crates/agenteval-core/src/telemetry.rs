//! Centralised tracing initialisation for AgentEval binaries.
//!
//! Call [`init_tracing`] once at program start to configure the global
//! subscriber with an `EnvFilter` and optional JSON formatting. Later calls
//! are ignored; the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON log lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// Resolved subscriber settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Newline-delimited JSON instead of the human-readable format.
    pub json: bool,
    /// Default verbosity when `RUST_LOG` is not set.
    pub level: Level,
}

impl LogSettings {
    /// Settings from the `observability` section of a configuration.
    /// Unknown level names fall back to `info`.
    pub fn from_config(config: &ObservabilityConfig) -> Self {
        Self {
            json: config.json,
            level: parse_level(&config.log_level),
        }
    }

    /// Apply command-line flags: `json` forces JSON output, `verbose`
    /// forces `debug`. Unset flags keep the configured values.
    pub fn with_overrides(mut self, json: bool, verbose: bool) -> Self {
        self.json |= json;
        if verbose {
            self.level = Level::DEBUG;
        }
        self
    }

    pub fn init(self) {
        init_tracing(self.json, self.level);
    }
}

/// Initialise from the `observability` section of a configuration.
pub fn init_from_config(config: &ObservabilityConfig) {
    LogSettings::from_config(config).init();
}

pub(crate) fn parse_level(name: &str) -> Level {
    name.parse().unwrap_or(Level::INFO)
}
