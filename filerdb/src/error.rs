use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilerDbError {
    #[error("No database path was configured (set DATABASE_PATH or path)")]
    NoDatabasePath,

    #[error("A default database must be selected")]
    DatabaseNotSelected,

    #[error("Database not found: {name}")]
    DatabaseNotFound { name: String },

    #[error("Collection does not exist: {database}/{name}")]
    CollectionNotExist { database: String, name: String },

    #[error("Database already exists: {name}")]
    DatabaseExists { name: String },

    #[error("Collection already exists: {database}/{name}")]
    CollectionExists { database: String, name: String },

    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to persist file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Stable, closed set of failure codes for programmatic branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoDatabasePath,
    DatabaseNotSelected,
    DatabaseNotFound,
    CollectionNotExist,
    DatabaseExists,
    CollectionExists,
    DocumentNotFound,
    InvalidName,
    InvalidDocument,
    Io,
    Serialization,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoDatabasePath => "NO_DATABASE_PATH",
            ErrorKind::DatabaseNotSelected => "DATABASE_NOT_SELECTED",
            ErrorKind::DatabaseNotFound => "DATABASE_NOT_FOUND",
            ErrorKind::CollectionNotExist => "COLLECTION_NOT_EXIST",
            ErrorKind::DatabaseExists => "DATABASE_EXISTS",
            ErrorKind::CollectionExists => "COLLECTION_EXISTS",
            ErrorKind::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            ErrorKind::InvalidName => "INVALID_NAME",
            ErrorKind::InvalidDocument => "INVALID_DOCUMENT",
            ErrorKind::Io => "IO_ERROR",
            ErrorKind::Serialization => "SERIALIZATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FilerDbError {
    /// The stable code for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FilerDbError::NoDatabasePath => ErrorKind::NoDatabasePath,
            FilerDbError::DatabaseNotSelected => ErrorKind::DatabaseNotSelected,
            FilerDbError::DatabaseNotFound { .. } => ErrorKind::DatabaseNotFound,
            FilerDbError::CollectionNotExist { .. } => ErrorKind::CollectionNotExist,
            FilerDbError::DatabaseExists { .. } => ErrorKind::DatabaseExists,
            FilerDbError::CollectionExists { .. } => ErrorKind::CollectionExists,
            FilerDbError::DocumentNotFound { .. } => ErrorKind::DocumentNotFound,
            FilerDbError::InvalidName(_) => ErrorKind::InvalidName,
            FilerDbError::InvalidDocument(_) => ErrorKind::InvalidDocument,
            FilerDbError::Io(_) | FilerDbError::Persist(_) => ErrorKind::Io,
            FilerDbError::Json(_) | FilerDbError::Yaml(_) => ErrorKind::Serialization,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilerDbError>;
