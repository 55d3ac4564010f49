//! Typed configuration sections for paging and SQL generation.

use folio_core::{ConfigError, ConfigProperties, FolioConfig};

use crate::page::DEFAULT_PAGE_SIZE;
use crate::page_result::DEFAULT_MARGIN;
use crate::query::{Dialect, IdentifierPolicy};

/// Paging defaults (`folio.paging`).
///
/// ```yaml
/// folio:
///   paging:
///     size: 25
///     maxsize: 100
///     margin: 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingConfig {
    /// Page size used when a request does not give one.
    pub size: u64,
    /// Upper bound for requested page sizes.
    pub max_size: Option<u64>,
    /// Pagination window margin.
    pub margin: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            max_size: None,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl ConfigProperties for PagingConfig {
    fn prefix() -> &'static str {
        "folio.paging"
    }

    fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            size: config.get_or(&Self::key("size"), defaults.size)?.max(1),
            max_size: config.get_or(&Self::key("maxsize"), None)?,
            margin: config.get_or(&Self::key("margin"), defaults.margin)?.max(1),
        })
    }
}

/// SQL generation settings (`folio.sql`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlConfig {
    pub dialect: Dialect,
    pub identifiers: IdentifierPolicy,
}

impl ConfigProperties for SqlConfig {
    fn prefix() -> &'static str {
        "folio.sql"
    }

    fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            dialect: parse_key(config, &Self::key("dialect"), "generic | sqlite | mysql | postgres")?,
            identifiers: parse_key(config, &Self::key("identifiers"), "raw | validate | quote")?,
        })
    }
}

fn parse_key<V>(config: &FolioConfig, key: &str, expected: &'static str) -> Result<V, ConfigError>
where
    V: std::str::FromStr + Default,
{
    match config.get_or::<Option<String>>(key, None)? {
        Some(raw) => raw.parse().map_err(|_| ConfigError::TypeMismatch {
            key: key.to_string(),
            expected,
        }),
        None => Ok(V::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_section_is_missing() {
        let config = FolioConfig::empty();
        assert_eq!(PagingConfig::from_config(&config).unwrap(), PagingConfig::default());
        assert_eq!(SqlConfig::from_config(&config).unwrap(), SqlConfig::default());
    }

    #[test]
    fn reads_yaml_section() {
        let config = FolioConfig::from_yaml_str(
            "folio:\n  paging:\n    size: 25\n    maxsize: 100\n    margin: 0\n  sql:\n    dialect: postgres\n    identifiers: quote\n",
            "test",
        )
        .unwrap();
        let paging = PagingConfig::from_config(&config).unwrap();
        assert_eq!(paging.size, 25);
        assert_eq!(paging.max_size, Some(100));
        assert_eq!(paging.margin, 1);

        let sql = SqlConfig::from_config(&config).unwrap();
        assert_eq!(sql.dialect, Dialect::Postgres);
        assert_eq!(sql.identifiers, IdentifierPolicy::Quote);
    }

    #[test]
    fn unknown_dialect_is_a_type_mismatch() {
        let config = FolioConfig::from_yaml_str("folio:\n  sql:\n    dialect: oracle\n", "test").unwrap();
        let err = SqlConfig::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { ref key, .. } if key == "folio.sql.dialect"));
    }
}
