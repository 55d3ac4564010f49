//! Ambient services shared by the folio crates: layered configuration and
//! `tracing` subscriber setup.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigProperties, ConfigValue, FolioConfig, FromConfigValue};
pub use logging::{init_tracing, try_init_tracing, LogConfig, LogFormat};
