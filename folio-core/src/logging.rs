use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{ConfigError, ConfigProperties, FolioConfig};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Logging section (`folio.log`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Output format (`pretty` or `json`).
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl ConfigProperties for LogConfig {
    fn prefix() -> &'static str {
        "folio.log"
    }

    fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        let key = Self::key("format");
        let format = match config.get::<Option<String>>(&key) {
            Ok(Some(raw)) => raw.parse().map_err(|_| ConfigError::TypeMismatch {
                key,
                expected: "pretty | json",
            })?,
            Ok(None) | Err(ConfigError::NotFound(_)) => LogFormat::default(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            format,
            filter: config.get_or(&Self::key("filter"), DEFAULT_FILTER.to_string())?,
        })
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter. Fails if a global subscriber
/// is already installed.
pub fn try_init_tracing(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    match config.format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false);
            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false);
            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
    }
}

/// Install the global `tracing` subscriber, ignoring a second initialization.
pub fn init_tracing(config: &LogConfig) {
    if let Err(e) = try_init_tracing(config) {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}
