use std::fs;

use folio_core::config::{ConfigError, ConfigProperties, ConfigValue, FolioConfig};
use serial_test::serial;

#[test]
fn test_empty_config() {
    let config = FolioConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_set_and_get() {
    let mut config = FolioConfig::empty();
    config.set("folio.sql.dialect", ConfigValue::String("postgres".into()));
    assert_eq!(config.get::<String>("folio.sql.dialect").unwrap(), "postgres");
}

#[test]
fn test_get_or_default() {
    let config = FolioConfig::empty();
    assert_eq!(config.get_or("folio.paging.size", 20u64).unwrap(), 20);
}

#[test]
fn test_get_or_reports_bad_type() {
    let mut config = FolioConfig::empty();
    config.set("folio.paging.size", ConfigValue::String("lots".into()));
    assert!(matches!(
        config.get_or("folio.paging.size", 20u64),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn test_type_conversions() {
    let mut config = FolioConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("float_val", ConfigValue::Float(2.5));
    config.set("bool_val", ConfigValue::Bool(true));
    config.set("null_val", ConfigValue::Null);

    assert_eq!(config.get::<i64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<u64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<f64>("float_val").unwrap(), 2.5);
    assert!(config.get::<bool>("bool_val").unwrap());
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
folio:
  paging:
    size: 25
    margin: 3
  sql:
    dialect: "mysql"
"#;
    let config = FolioConfig::from_yaml_str(yaml, "test").unwrap();

    assert_eq!(config.get::<u64>("folio.paging.size").unwrap(), 25);
    assert_eq!(config.get::<u64>("folio.paging.margin").unwrap(), 3);
    assert_eq!(config.get::<String>("folio.sql.dialect").unwrap(), "mysql");
    assert_eq!(config.profile(), "test");
}

#[test]
fn test_invalid_yaml() {
    let result = FolioConfig::from_yaml_str("folio: [unclosed", "test");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[derive(Debug, Clone, PartialEq)]
struct ListingConfig {
    title: String,
    columns: Vec<String>,
}

impl ConfigProperties for ListingConfig {
    fn prefix() -> &'static str {
        "listing"
    }

    fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: config.get(&Self::key("title"))?,
            columns: config.get_or(&Self::key("columns"), Vec::new())?,
        })
    }
}

#[test]
fn test_with_typed() {
    let yaml = r#"
listing:
  title: "Artists"
  columns: [name, created]
"#;
    let config = FolioConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<ListingConfig>()
        .unwrap();

    assert_eq!(config.title, "Artists");
    assert_eq!(config.columns, vec!["name", "created"]);
    assert_eq!(config.raw().get::<String>("listing.title").unwrap(), "Artists");
}

#[test]
fn test_with_typed_missing_required() {
    let result = FolioConfig::empty().with_typed::<ListingConfig>();
    assert!(matches!(result, Err(ConfigError::NotFound(key)) if key == "listing.title"));
}

#[test]
#[serial]
fn test_load_from_dir_with_profile_override() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("folio.yaml"),
        "folio:\n  paging:\n    size: 10\n    margin: 2\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("folio-prod.yaml"),
        "folio:\n  paging:\n    size: 50\n",
    )
    .unwrap();

    let config = FolioConfig::load_from_dir(dir.path(), "prod").unwrap();
    assert_eq!(config.profile(), "prod");
    assert_eq!(config.get::<u64>("folio.paging.size").unwrap(), 50);
    assert_eq!(config.get::<u64>("folio.paging.margin").unwrap(), 2);
}

#[test]
#[serial]
fn test_env_overrides_yaml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("folio.yaml"), "folio:\n  paging:\n    size: 10\n").unwrap();

    std::env::set_var("FOLIO_PAGING_SIZE", "75");
    let config = FolioConfig::load_from_dir(dir.path(), "dev");
    std::env::remove_var("FOLIO_PAGING_SIZE");

    assert_eq!(config.unwrap().get::<u64>("folio.paging.size").unwrap(), 75);
}

#[test]
#[serial]
fn test_dotenv_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".env.dotenvtest"), "FOLIO_SQL_DIALECT=postgres\n").unwrap();

    let config = FolioConfig::load_from_dir(dir.path(), "dotenvtest");
    std::env::remove_var("FOLIO_SQL_DIALECT");

    assert_eq!(
        config.unwrap().get::<String>("folio.sql.dialect").unwrap(),
        "postgres"
    );
}

#[test]
#[serial]
fn test_missing_files_yield_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = FolioConfig::load_from_dir(dir.path(), "dev").unwrap();
    assert!(!config.contains_key("folio.paging.size"));
}
