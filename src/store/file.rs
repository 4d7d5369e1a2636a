//! JSON file store
//!
//! Keeps the whole key space as one JSON object on disk. Every write
//! rewrites the file through a sibling temp file and a rename, so a crash
//! leaves either the old or the new document, never a torn one.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StoreError};

/// File-backed key-value store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => match serde_json::from_str::<Value>(&contents)? {
                Value::Object(map) => map,
                other => {
                    return Err(StoreError::invalid_document(
                        path.display().to_string(),
                        format!("expected a JSON object, found {}", type_name(&other)),
                    ))
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(StoreError::io(path, e)),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened JSON store");

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let body = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&tmp, body).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        if value.is_null() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), value);
        }
        self.flush()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
