// Collection handle - documents stored as a JSON array in <root>/<database>/<collection>.json

use crate::config::Config;
use crate::error::{FilerDbError, Result};
use crate::timestamp::Timestamp;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// File extension used for collection files.
pub(crate) const COLLECTION_EXT: &str = "json";

/// A handle to one collection inside one database.
///
/// The handle only holds the (database, collection) pair and a snapshot of
/// the settings it was built with. Every operation reads the backing file
/// again, so several handles to the same collection can coexist.
/// Without a storage root every operation fails with `NoDatabasePath`.
#[derive(Debug, Clone)]
pub struct Collection {
    database: String,
    name: String,
    location: Option<Location>,
    timestamp: Timestamp,
}

#[derive(Debug, Clone)]
struct Location {
    database_dir: PathBuf,
    file: PathBuf,
}

impl Collection {
    pub fn new(config: &Config, database: &str, name: &str) -> Self {
        let location = config.storage_path().map(|root| {
            let database_dir = root.join(database);
            let file = collection_file(&database_dir, name);
            Location { database_dir, file }
        });
        Collection {
            database: database.to_string(),
            name: name.to_string(),
            location,
            timestamp: Timestamp::new(config),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the backing JSON file, `None` without a storage root.
    pub fn path(&self) -> Option<&Path> {
        self.location.as_ref().map(|loc| loc.file.as_path())
    }

    pub fn exists(&self) -> bool {
        self.path().is_some_and(Path::is_file)
    }

    /// All documents in insertion order.
    pub fn all(&self) -> Result<Vec<Value>> {
        self.load()
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// Get a document by ID
    pub fn get(&self, id: &str) -> Result<Value> {
        self.load()?
            .into_iter()
            .find(|doc| document_id(doc) == Some(id))
            .ok_or_else(|| self.not_found(id))
    }

    /// Insert a new document. Returns the document ID.
    ///
    /// A string `id` already present on the document is kept, otherwise a
    /// UUID is generated. `createdAt` and `updatedAt` are stamped.
    pub fn insert(&self, data: Value) -> Result<String> {
        let mut fields = into_object(data)?;
        let mut docs = self.load()?;

        let id = match fields.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::String(_)) | None => uuid::Uuid::new_v4().to_string(),
            Some(other) => {
                return Err(FilerDbError::InvalidDocument(format!(
                    "'{ID_FIELD}' must be a string, got {other}"
                )))
            }
        };
        if docs.iter().any(|doc| document_id(doc) == Some(id.as_str())) {
            return Err(FilerDbError::InvalidDocument(format!(
                "duplicate id '{id}' in {}/{}",
                self.database, self.name
            )));
        }

        let now = Value::String(self.timestamp.now());
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        fields.insert(CREATED_AT_FIELD.to_string(), now.clone());
        fields.insert(UPDATED_AT_FIELD.to_string(), now);

        docs.push(Value::Object(fields));
        self.save(&docs)?;
        log::debug!("Inserted document '{id}' into {}/{}", self.database, self.name);
        Ok(id)
    }

    /// Shallow-merge `patch` into an existing document and return the result.
    /// `id` and `createdAt` cannot be overwritten.
    pub fn update(&self, id: &str, patch: Value) -> Result<Value> {
        let patch = into_object(patch)?;
        let mut docs = self.load()?;

        let doc = docs
            .iter_mut()
            .find(|doc| document_id(doc) == Some(id))
            .ok_or_else(|| self.not_found(id))?;

        let fields = doc.as_object_mut().ok_or_else(|| {
            FilerDbError::InvalidDocument(format!(
                "stored document '{id}' in {}/{} is not a JSON object",
                self.database, self.name
            ))
        })?;
        for (key, value) in patch {
            if key == ID_FIELD || key == CREATED_AT_FIELD {
                continue;
            }
            fields.insert(key, value);
        }
        fields.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(self.timestamp.now()),
        );
        let updated = doc.clone();

        self.save(&docs)?;
        Ok(updated)
    }

    /// Delete a document by ID.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut docs = self.load()?;
        let before = docs.len();
        docs.retain(|doc| document_id(doc) != Some(id));
        if docs.len() == before {
            return Err(self.not_found(id));
        }
        self.save(&docs)?;
        log::debug!("Deleted document '{id}' from {}/{}", self.database, self.name);
        Ok(())
    }

    /// Remove every document, keeping the collection itself.
    pub fn empty(&self) -> Result<()> {
        self.ensure_exists()?;
        self.save(&[])
    }

    fn location(&self) -> Result<&Location> {
        self.location.as_ref().ok_or(FilerDbError::NoDatabasePath)
    }

    fn ensure_exists(&self) -> Result<&Location> {
        let location = self.location()?;
        if !location.database_dir.is_dir() {
            return Err(FilerDbError::DatabaseNotFound {
                name: self.database.clone(),
            });
        }
        if !self.exists() {
            return Err(FilerDbError::CollectionNotExist {
                database: self.database.clone(),
                name: self.name.clone(),
            });
        }
        Ok(location)
    }

    fn load(&self) -> Result<Vec<Value>> {
        let location = self.ensure_exists()?;
        read_documents(&location.file)
    }

    fn save(&self, docs: &[Value]) -> Result<()> {
        let location = self.location()?;
        write_documents(&location.database_dir, &location.file, docs)
    }

    fn not_found(&self, id: &str) -> FilerDbError {
        FilerDbError::DocumentNotFound {
            collection: format!("{}/{}", self.database, self.name),
            id: id.to_string(),
        }
    }
}

pub(crate) fn collection_file(database_dir: &Path, name: &str) -> PathBuf {
    database_dir.join(format!("{name}.{COLLECTION_EXT}"))
}

/// Read a collection file. An empty file counts as an empty collection.
pub(crate) fn read_documents(file: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(file)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let docs: Vec<Value> = serde_json::from_str(&content)?;
    Ok(docs)
}

/// Write a collection file atomically via a temp file in the same directory.
pub(crate) fn write_documents(dir: &Path, file: &Path, docs: &[Value]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, docs)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(file)?;
    Ok(())
}

fn document_id(doc: &Value) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn into_object(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(fields) => Ok(fields),
        other => Err(FilerDbError::InvalidDocument(format!(
            "documents must be JSON objects, got {other}"
        ))),
    }
}
