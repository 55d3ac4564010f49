use super::{ConfigError, FolioConfig};

/// Trait for strongly-typed configuration sections.
///
/// Sections read their keys under [`prefix`](ConfigProperties::prefix) and
/// fall back to defaults for missing keys:
///
/// ```ignore
/// impl ConfigProperties for PagingConfig {
///     fn prefix() -> &'static str { "folio.paging" }
///
///     fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
///         Ok(Self {
///             size: config.get_or(&Self::key("size"), 20)?,
///             ..Default::default()
///         })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"folio.paging"`).
    fn prefix() -> &'static str;

    /// Construct from a `FolioConfig` instance.
    fn from_config(config: &FolioConfig) -> Result<Self, ConfigError>;

    /// Absolute key for a property of this section.
    fn key(property: &str) -> String {
        format!("{}.{property}", Self::prefix())
    }
}
