use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed preference file, the terminal analogue of the browser's
/// local storage. Values are opaque strings; callers own their encoding.
pub struct PrefStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl PrefStore {
    /// Open the store at `path`. A missing or unreadable file starts the
    /// store empty rather than failing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = fs
            ::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set and persist immediately, as the browser storage does.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.into());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let blob = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, blob)?;
        Ok(())
    }
}
