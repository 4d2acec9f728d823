use crate::collection::{self, Collection, COLLECTION_EXT};
use crate::config::Config;
use crate::error::{FilerDbError, Result};
use crate::registry::{is_valid_name, validate_name};
use std::path::{Path, PathBuf};

/// A handle to one database.
///
/// Building a handle never checks that the database exists; operations
/// that need the database directory report `DatabaseNotFound` themselves.
/// A handle built without a storage root resolves to nothing and reports
/// `NoDatabasePath`.
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    dir: Option<PathBuf>,
    config: Config,
}

impl Database {
    pub fn new(config: &Config, name: &str) -> Self {
        Database {
            name: name.to_string(),
            dir: config.storage_path().map(|root| root.join(name)),
            config: config.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Database directory, `None` when no storage root was configured.
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Settings this handle was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn exists(&self) -> bool {
        is_valid_name(&self.name) && self.dir.as_deref().is_some_and(Path::is_dir)
    }

    /// True iff collection `name` exists in this database right now.
    pub fn collection_exists(&self, name: &str) -> bool {
        match &self.dir {
            Some(dir) => is_valid_name(name) && collection::collection_file(dir, name).is_file(),
            None => false,
        }
    }

    /// Names of all collections, sorted.
    pub fn collections(&self) -> Result<Vec<String>> {
        let dir = self.ensure_exists()?;

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(COLLECTION_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_name(stem) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolve a collection in this database, checking that both exist.
    pub fn collection(&self, name: &str) -> Result<Collection> {
        self.ensure_exists()?;
        if !self.collection_exists(name) {
            return Err(self.collection_not_exist(name));
        }
        Ok(Collection::new(&self.config, &self.name, name))
    }

    /// Create an empty collection.
    pub fn create_collection(&self, name: &str) -> Result<Collection> {
        validate_name(name)?;
        let dir = self.ensure_exists()?;
        if self.collection_exists(name) {
            return Err(FilerDbError::CollectionExists {
                database: self.name.clone(),
                name: name.to_string(),
            });
        }
        let file = collection::collection_file(dir, name);
        collection::write_documents(dir, &file, &[])?;
        log::info!("Created collection '{}/{name}'", self.name);
        Ok(Collection::new(&self.config, &self.name, name))
    }

    /// Delete a collection and all of its documents.
    pub fn drop_collection(&self, name: &str) -> Result<()> {
        let dir = self.ensure_exists()?;
        if !self.collection_exists(name) {
            return Err(self.collection_not_exist(name));
        }
        std::fs::remove_file(collection::collection_file(dir, name))?;
        log::info!("Dropped collection '{}/{name}'", self.name);
        Ok(())
    }

    fn ensure_exists(&self) -> Result<&Path> {
        let dir = self.dir.as_deref().ok_or(FilerDbError::NoDatabasePath)?;
        if self.exists() {
            Ok(dir)
        } else {
            Err(FilerDbError::DatabaseNotFound {
                name: self.name.clone(),
            })
        }
    }

    fn collection_not_exist(&self, name: &str) -> FilerDbError {
        FilerDbError::CollectionNotExist {
            database: self.name.clone(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup_database() -> (TempDir, Database) {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("app")).unwrap();
        std::fs::write(tmp.path().join("app/users.json"), "[]").unwrap();
        let db = Database::new(&Config::new().path(tmp.path()), "app");
        (tmp, db)
    }

    #[test]
    fn test_collection_exists() {
        let (_tmp, db) = setup_database();
        assert!(db.exists());
        assert!(db.collection_exists("users"));
        assert!(!db.collection_exists("posts"));
        assert!(!db.collection_exists("../app/users"));
    }

    #[test]
    fn test_collections_lists_json_files() {
        let (tmp, db) = setup_database();
        std::fs::write(tmp.path().join("app/posts.json"), "[]").unwrap();
        std::fs::write(tmp.path().join("app/README.md"), "hi").unwrap();
        std::fs::create_dir(tmp.path().join("app/attachments")).unwrap();

        assert_eq!(db.collections().unwrap(), vec!["posts", "users"]);
    }

    #[test]
    fn test_handle_for_missing_database_defers_failure() {
        let tmp = TempDir::new().unwrap();
        let ghost = Database::new(&Config::new().path(tmp.path()), "ghost");
        assert_eq!(ghost.name(), "ghost");
        assert!(!ghost.exists());
        assert!(!ghost.collection_exists("users"));

        let err = ghost.collections().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatabaseNotFound);
        let err = ghost.collection("users").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatabaseNotFound);
    }

    #[test]
    fn test_collection_resolution() {
        let (_tmp, db) = setup_database();
        let users = db.collection("users").unwrap();
        assert_eq!((users.database(), users.name()), ("app", "users"));

        let err = db.collection("posts").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollectionNotExist);
    }

    #[test]
    fn test_create_and_drop_collection() {
        let (_tmp, db) = setup_database();

        let posts = db.create_collection("posts").unwrap();
        assert!(db.collection_exists("posts"));
        assert_eq!(posts.count().unwrap(), 0);

        let err = db.create_collection("posts").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollectionExists);

        db.drop_collection("posts").unwrap();
        assert!(!db.collection_exists("posts"));

        let err = db.drop_collection("posts").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollectionNotExist);
    }

    #[test]
    fn test_handle_without_storage_root_resolves_nowhere() {
        // "src" exists relative to the crate directory tests run in.
        let db = Database::new(&Config::new(), "src");
        assert_eq!(db.path(), None);
        assert!(!db.exists());
        assert!(!db.collection_exists("lib"));

        let err = db.collections().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDatabasePath);
        let err = db.create_collection("stray").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDatabasePath);
        let err = db.drop_collection("lib").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDatabasePath);
        assert!(!Path::new("src/stray.json").exists());
    }

    #[test]
    fn test_create_collection_validates_name() {
        let (_tmp, db) = setup_database();
        let err = db.create_collection("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
    }
}
