use log::{debug, warn};
use serde_json::{Map, Value};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::StoreError;

/// The single JSON document the server owns, kept in one file.
///
/// Reads and writes always cover the whole file. There is no lock: two saves
/// racing each other end with one of them on disk, never a mix of both,
/// because every write lands in a temp file that is renamed into place.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    data_file: PathBuf,
}

impl DocumentRepository {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn data_dir(&self) -> PathBuf {
        match self.data_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// The stored document, or `None` when nothing has been saved yet.
    pub async fn try_load(&self) -> Result<Option<Value>, StoreError> {
        let bytes = match tokio::fs::read(&self.data_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Never fails: a missing, unreadable or corrupt file all read as `{}`.
    pub async fn load(&self) -> Value {
        match self.try_load().await {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!("No saved document at {:?}", self.data_file);
                Value::Object(Map::new())
            }
            Err(e) => {
                warn!("Treating {:?} as empty: {e}", self.data_file);
                Value::Object(Map::new())
            }
        }
    }

    /// Parses `body` as JSON and replaces the stored document with it.
    /// Invalid UTF-8 is decoded lossily first. Nothing on disk changes when
    /// parsing fails.
    pub async fn save_raw(&self, body: &[u8]) -> Result<(), StoreError> {
        let text = String::from_utf8_lossy(body);
        let document: Value = serde_json::from_str(&text)?;
        self.save(&document).await
    }

    pub async fn save(&self, document: &Value) -> Result<(), StoreError> {
        let pretty = serde_json::to_string_pretty(document)?;
        let dir = self.data_dir();
        let target = self.data_file.clone();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(pretty.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target)?;
            Ok(())
        })
        .await??;

        debug!("Saved document to {:?}", self.data_file);
        Ok(())
    }
}
