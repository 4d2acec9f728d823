use crate::error::{FilerDbError, Result};
use std::path::{Path, PathBuf};

/// View over the databases stored under the storage root.
/// Each database is a subdirectory; nothing is cached, every call asks the filesystem.
#[derive(Debug, Clone)]
pub struct Databases {
    root: PathBuf,
}

impl Databases {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Databases { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True iff a database called `name` exists right now.
    /// A missing root or an invalid name is a plain `false`.
    pub fn exists(&self, name: &str) -> bool {
        if !is_valid_name(name) {
            return false;
        }
        let exists = self.root.join(name).is_dir();
        log::debug!("Database '{name}' exists under {}: {exists}", self.root.display());
        exists
    }

    /// Names of all databases, sorted. A missing root yields an empty list.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {e}", self.root.display());
                    continue;
                }
            };
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_valid_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Create a database directory, creating the storage root if needed.
    pub fn create(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let dir = self.root.join(name);
        if dir.exists() {
            return Err(FilerDbError::DatabaseExists {
                name: name.to_string(),
            });
        }
        std::fs::create_dir_all(&dir)?;
        log::info!("Created database '{name}' at {}", dir.display());
        Ok(())
    }

    /// Remove a database and every collection in it.
    pub fn drop(&self, name: &str) -> Result<()> {
        if !self.exists(name) {
            return Err(FilerDbError::DatabaseNotFound {
                name: name.to_string(),
            });
        }
        std::fs::remove_dir_all(self.root.join(name))?;
        log::info!("Dropped database '{name}'");
        Ok(())
    }
}

/// Database and collection names map directly onto file names.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(FilerDbError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_exists_reflects_directories() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("db1")).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        let dbs = Databases::new(tmp.path());
        assert!(dbs.exists("db1"));
        assert!(!dbs.exists("db2"));
        assert!(!dbs.exists("notes.txt"));
    }

    #[test]
    fn test_missing_root_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let dbs = Databases::new(tmp.path().join("does-not-exist"));
        assert!(!dbs.exists("db1"));
        assert_eq!(dbs.list().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_invalid_names_never_exist() {
        let tmp = TempDir::new().unwrap();
        let dbs = Databases::new(tmp.path());
        assert!(!dbs.exists(""));
        assert!(!dbs.exists(".."));
        assert!(!dbs.exists("a/b"));
    }

    #[test]
    fn test_exists_is_checked_at_call_time() {
        let tmp = TempDir::new().unwrap();
        let dbs = Databases::new(tmp.path());
        assert!(!dbs.exists("late"));
        std::fs::create_dir(tmp.path().join("late")).unwrap();
        assert!(dbs.exists("late"));
        std::fs::remove_dir(tmp.path().join("late")).unwrap();
        assert!(!dbs.exists("late"));
    }

    #[test]
    fn test_list_is_sorted_and_skips_files() {
        let tmp = TempDir::new().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            std::fs::create_dir(tmp.path().join(name)).unwrap();
        }
        std::fs::write(tmp.path().join("stray.json"), "[]").unwrap();

        let dbs = Databases::new(tmp.path());
        assert_eq!(dbs.list().unwrap(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_create_and_drop() {
        let tmp = TempDir::new().unwrap();
        let dbs = Databases::new(tmp.path().join("store"));

        dbs.create("app").unwrap();
        assert!(dbs.exists("app"));

        let err = dbs.create("app").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatabaseExists);

        dbs.drop("app").unwrap();
        assert!(!dbs.exists("app"));

        let err = dbs.drop("app").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatabaseNotFound);
    }

    #[test]
    fn test_create_rejects_invalid_name() {
        let tmp = TempDir::new().unwrap();
        let dbs = Databases::new(tmp.path());
        let err = dbs.create("../escape").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
    }
}
