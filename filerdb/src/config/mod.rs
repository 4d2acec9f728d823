//! Instance configuration: the storage root, the optional default database,
//! and any extra options passed through for downstream consumers.

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Canonical option name for the storage root.
pub const DATABASE_PATH: &str = "DATABASE_PATH";
/// Backward-compatible alias for [`DATABASE_PATH`].
pub const PATH_ALIAS: &str = "path";
/// Option naming a database to auto-select at construction.
pub const DATABASE: &str = "database";
/// Option holding a chrono format string for document timestamps.
pub const TIMESTAMP_FORMAT: &str = "TIMESTAMP_FORMAT";

/// Resolved settings for an [`Instance`](crate::Instance).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub database_path: Option<PathBuf>,
    pub database: Option<String>,
    pub timestamp_format: Option<String>,
    /// Unknown options, kept verbatim.
    pub extra: BTreeMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from an option mapping, applying each key through [`Config::set`].
    pub fn from_options<I, K>(options: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut config = Config::default();
        for (key, value) in options {
            config.set(key.as_ref(), value);
        }
        config
    }

    /// Parse an option mapping from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let options: BTreeMap<String, Value> = serde_yaml::from_str(content)?;
        Ok(Self::from_options(options))
    }

    /// Load an option mapping from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.database = Some(name.into());
        self
    }

    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    /// Set a single option. `path` is stored as `DATABASE_PATH`.
    /// Falsy values (null, false, 0, "", "0") clear known options.
    pub fn set(&mut self, name: &str, value: Value) {
        match name {
            DATABASE_PATH | PATH_ALIAS => {
                self.database_path = truthy_string(&value).map(PathBuf::from);
            }
            DATABASE => self.database = truthy_string(&value),
            TIMESTAMP_FORMAT => self.timestamp_format = truthy_string(&value),
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
    }

    /// Read a single option, `None` when unset.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            DATABASE_PATH | PATH_ALIAS => self
                .database_path
                .as_ref()
                .map(|p| Value::String(p.to_string_lossy().into_owned())),
            DATABASE => self.database.clone().map(Value::String),
            TIMESTAMP_FORMAT => self.timestamp_format.clone().map(Value::String),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// The storage root, if set to something non-empty.
    pub fn storage_path(&self) -> Option<&Path> {
        self.database_path
            .as_deref()
            .filter(|p| !is_falsy_str(&p.to_string_lossy()))
    }

    /// The database to auto-select, if set to something non-empty.
    pub fn default_database(&self) -> Option<&str> {
        self.database.as_deref().filter(|name| !is_falsy_str(name))
    }
}

fn is_falsy_str(s: &str) -> bool {
    s.is_empty() || s == "0"
}

fn truthy_string(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if is_falsy_str(s) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_alias_is_renamed() {
        let config = Config::from_options([("path", json!("/tmp/store"))]);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/store")));
        assert_eq!(config.get(DATABASE_PATH), Some(json!("/tmp/store")));
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let config = Config::from_options([
            ("DATABASE_PATH", json!("/data")),
            ("pretty", json!(true)),
            ("retries", json!(3)),
        ]);
        assert_eq!(config.get("pretty"), Some(json!(true)));
        assert_eq!(config.get("retries"), Some(json!(3)));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let config = Config::new();
        assert_eq!(config.get(DATABASE_PATH), None);
        assert_eq!(config.get(DATABASE), None);
        assert_eq!(config.get("nope"), None);
    }

    #[test]
    fn test_falsy_values_are_unset() {
        let mut config = Config::new().path("/data").database("db1");
        config.set(DATABASE, json!(""));
        config.set(PATH_ALIAS, json!(false));
        assert_eq!(config.default_database(), None);
        assert_eq!(config.storage_path(), None);
    }

    #[test]
    fn test_zero_is_falsy() {
        let config = Config::from_options([("path", json!(0)), ("database", json!("0"))]);
        assert_eq!(config.storage_path(), None);
        assert_eq!(config.default_database(), None);

        let config = Config::from_options([("path", json!("0")), ("database", json!(0.0))]);
        assert_eq!(config.storage_path(), None);
        assert_eq!(config.default_database(), None);

        let config = Config::new().path("0").database("0");
        assert_eq!(config.storage_path(), None);
        assert_eq!(config.default_database(), None);

        let config = Config::from_options([("path", json!("/data")), ("database", json!(7))]);
        assert_eq!(config.default_database(), Some("7"));
    }

    #[test]
    fn test_empty_builder_values_are_not_usable() {
        let config = Config::new().path("").database("");
        assert_eq!(config.storage_path(), None);
        assert_eq!(config.default_database(), None);
    }

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml_str(
            "path: /var/lib/filer\ndatabase: app\nTIMESTAMP_FORMAT: \"%Y-%m-%d\"\nowner: ops\n",
        )
        .unwrap();
        assert_eq!(config.storage_path(), Some(Path::new("/var/lib/filer")));
        assert_eq!(config.default_database(), Some("app"));
        assert_eq!(config.timestamp_format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(config.get("owner"), Some(json!("ops")));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("filerdb.yaml");
        std::fs::write(&file, "DATABASE_PATH: ./store\n").unwrap();

        let config = Config::load(&file).unwrap();
        assert_eq!(config.storage_path(), Some(Path::new("./store")));
    }
}
