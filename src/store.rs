use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{error, trace};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{internal_error, ApiError};
use crate::seed;
use crate::types::Document;

fn default_path() -> String {
    "data.json".to_string()
}

fn default_seed() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StorageConfig {
    File {
        #[serde(default = "default_path")]
        path: String,
    },
    Memory {
        #[serde(default = "default_seed")]
        seed: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File {
            path: default_path(),
        }
    }
}

/// Holder of the persisted document. Every read loads the whole document
/// and every write replaces it, nothing is cached in between.
#[async_trait]
pub trait Store: Send + Sync {
    /// Never fails: an unreadable document is logged and read as empty.
    async fn load(&self) -> Document;

    /// Load ahead of a save. Fails where `load` would degrade, so a write
    /// never replaces data that could not be read.
    async fn load_for_write(&self) -> Result<Document, ApiError> {
        Ok(self.load().await)
    }

    async fn save(&self, doc: &Document) -> Result<(), ApiError>;

    /// Where the data lives, for the startup banner.
    fn location(&self) -> String;
}

pub fn create_store(config: StorageConfig) -> Arc<dyn Store> {
    match config {
        StorageConfig::File { path } => Arc::new(FileStore::new(path)),
        StorageConfig::Memory { seed: true } => Arc::new(MemoryStore::seeded()),
        StorageConfig::Memory { seed: false } => {
            Arc::new(MemoryStore::new(Document::default()))
        }
    }
}

/// Json file, rewritten as a whole on every save.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing (or blank) file is an empty document, anything else that
    /// cannot be read or parsed is an error.
    async fn read(&self) -> Result<Document, ApiError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!("pawtner: no data file at {:?}", self.path);
                return Ok(Document::default());
            }
            Err(err) => return Err(internal_error("Failed to read data", err)),
        };
        if content.trim().is_empty() {
            return Ok(Document::default());
        }
        serde_json::from_str::<Document>(&content)
            .map_err(|err| internal_error("Failed to read data", err))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn load(&self) -> Document {
        self.read().await.unwrap_or_else(|err| {
            error!("Using empty document for {:?}: {}", self.path, err);
            Document::default()
        })
    }

    async fn load_for_write(&self) -> Result<Document, ApiError> {
        self.read().await
    }

    async fn save(&self, doc: &Document) -> Result<(), ApiError> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|err| internal_error("Failed to save data", err))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|err| internal_error("Failed to save data", err))?;
        trace!("pawtner: saved data file {:?}", self.path);
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Process-local document, lost on exit.
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed::document())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> Document {
        self.doc.lock().await.clone()
    }

    async fn save(&self, doc: &Document) -> Result<(), ApiError> {
        *self.doc.lock().await = doc.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data.json"));
        assert_eq!(store.load().await, Document::default());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty_but_refuses_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = FileStore::new(&path);
        assert_eq!(store.load().await, Document::default());

        let err = store.load_for_write().await.unwrap_err();
        assert_eq!(err.message, "Failed to read data");
    }

    #[tokio::test]
    async fn missing_or_blank_file_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = FileStore::new(&path);
        assert_eq!(store.load_for_write().await.unwrap(), Document::default());

        std::fs::write(&path, "\n").unwrap();
        assert_eq!(store.load_for_write().await.unwrap(), Document::default());
    }

    #[tokio::test]
    async fn odd_record_does_not_empty_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{
                "pets": [
                    { "id": 1, "name": "Buddy", "type": "Dog", "age": 3 },
                    { "id": 2, "name": "Ghost", "type": "Cat", "age": null }
                ],
                "volunteers": [{ "id": 1, "name": "Priya", "role": "Caretaker" }],
                "donations": [{ "id": 1, "donorName": "Anonymous", "amount": 5000 }]
            }"#,
        )
        .unwrap();
        let store = FileStore::new(&path);
        let doc = store.load_for_write().await.unwrap();
        assert_eq!(doc.pets.len(), 2);
        assert_eq!(doc.pets[1].age, 0);
        assert_eq!(doc.volunteers.len(), 1);
        assert_eq!(doc.donations.len(), 1);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = FileStore::new(&path);
        let doc = seed::document();
        store.save(&doc).await.unwrap();
        assert_eq!(store.load().await, doc);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"pets\": [\n"));
        assert!(text.contains("\"donorName\": \"Anonymous\""));
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("data.json"));
        let err = store.save(&Document::default()).await.unwrap_err();
        assert_eq!(err.message, "Failed to save data");
        assert!(err.error.is_some());
    }

    #[tokio::test]
    async fn memory_store_keeps_last_save() {
        let store = MemoryStore::new(Document::default());
        let doc = seed::document();
        store.save(&doc).await.unwrap();
        assert_eq!(store.load().await.pets.len(), 10);
    }

    #[test]
    fn storage_config_is_tagged_by_kind() {
        let config: StorageConfig =
            serde_json::from_str(r#"{ "kind": "memory" }"#).unwrap();
        assert_eq!(config, StorageConfig::Memory { seed: true });
        let config: StorageConfig =
            serde_json::from_str(r#"{ "kind": "file", "path": "/tmp/x.json" }"#)
                .unwrap();
        assert_eq!(
            config,
            StorageConfig::File {
                path: "/tmp/x.json".to_string()
            }
        );
    }
}
