use crate::collection::Collection;
use crate::config::Config;
use crate::database::Database;
use crate::error::{FilerDbError, Result};
use crate::registry::Databases;
use crate::timestamp::Timestamp;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Process-local health flags, computed during initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    /// The storage root existed and a file could be created in it.
    pub database_is_writable: bool,
}

/// The main entry point for FilerDB.
///
/// Validates the configuration, builds the databases registry, and optionally
/// selects a default database so `collection()` can be called without naming
/// the database every time. Mutating methods take `&mut self`; sharing an
/// instance between threads requires the caller's own synchronization.
#[derive(Debug)]
pub struct Instance {
    config: Config,
    databases: Databases,
    default_database: Option<Database>,
    timestamp: Timestamp,
    status: Status,
}

impl Instance {
    /// Create an instance. Fails with `NoDatabasePath` before touching the
    /// filesystem if no storage root is configured. When the config names a
    /// database, it is selected as part of construction.
    pub fn new(config: Config) -> Result<Self> {
        let root = match config.storage_path() {
            Some(root) => root.to_path_buf(),
            None => return Err(FilerDbError::NoDatabasePath),
        };

        let databases = Databases::new(&root);
        let timestamp = Timestamp::new(&config);
        let status = Status {
            database_is_writable: is_writable(&root),
        };
        if !root.exists() {
            log::debug!("Storage root {} does not exist yet", root.display());
        } else if !status.database_is_writable {
            log::warn!("Storage root {} is not writable", root.display());
        }

        let mut instance = Instance {
            config,
            databases,
            default_database: None,
            timestamp,
            status,
        };
        instance.check_default_database()?;
        Ok(instance)
    }

    /// Create an instance from an option mapping (`path` is accepted for `DATABASE_PATH`).
    pub fn from_options<I, K>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        Self::new(Config::from_options(options))
    }

    fn check_default_database(&mut self) -> Result<()> {
        if let Some(name) = self.config.default_database().map(str::to_string) {
            log::debug!("Auto-selecting default database '{name}'");
            self.select_database(&name)?;
        }
        Ok(())
    }

    /// A handle to any database, without checking that it exists.
    pub fn database(&self, name: &str) -> Database {
        Database::new(&self.config, name)
    }

    /// Make `name` the default database. Existence is checked on every call.
    /// Fails with `NoDatabasePath` if the storage root was cleared through `set`.
    pub fn select_database(&mut self, name: &str) -> Result<()> {
        if self.config.storage_path().is_none() {
            return Err(FilerDbError::NoDatabasePath);
        }
        if !self.databases.exists(name) {
            return Err(FilerDbError::DatabaseNotFound {
                name: name.to_string(),
            });
        }
        self.default_database = Some(Database::new(&self.config, name));
        log::debug!("Selected default database '{name}'");
        Ok(())
    }

    /// A collection in the default database.
    pub fn collection(&self, name: &str) -> Result<Collection> {
        let database = self
            .default_database
            .as_ref()
            .ok_or(FilerDbError::DatabaseNotSelected)?;

        if !database.collection_exists(name) {
            return Err(FilerDbError::CollectionNotExist {
                database: database.name().to_string(),
                name: name.to_string(),
            });
        }

        Ok(Collection::new(database.config(), database.name(), name))
    }

    /// Set a configuration option. Applies to handles created afterwards.
    pub fn set(&mut self, name: &str, value: Value) {
        self.config.set(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.config.get(name)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn databases(&self) -> &Databases {
        &self.databases
    }

    pub fn default_database(&self) -> Option<&Database> {
        self.default_database.as_ref()
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

/// Permission bits do not account for ownership, so try an actual write.
fn is_writable(root: &Path) -> bool {
    root.is_dir() && tempfile::tempfile_in(root).is_ok()
}
