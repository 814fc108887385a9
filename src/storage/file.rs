use crate::error::TransformError;
use crate::storage::{SettingsStore, API_KEY};
use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Settings kept as one JSON object in a file, rewritten on every `set`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    fallback_api_key: Option<String>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback_api_key: None,
        }
    }

    /// API key served while the file holds none of its own
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.fallback_api_key = Some(api_key.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, TransformError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(TransformError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(TransformError::Storage(format!(
                "{} is not valid JSON: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, TransformError> {
        let value = self.load().await?.remove(key);
        if key != API_KEY {
            return Ok(value);
        }
        match (value, &self.fallback_api_key) {
            (Some(Value::String(stored)), _) if !stored.trim().is_empty() => {
                Ok(Some(Value::String(stored)))
            }
            (_, Some(fallback)) => Ok(Some(Value::String(fallback.clone()))),
            (value, None) => Ok(value),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), TransformError> {
        let mut map = self.load().await?;
        map.insert(key.to_string(), value);

        let serialized = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| TransformError::Storage(e.to_string()))?;
        fs::write(&self.path, serialized).await?;
        debug!("Stored '{}' in {}", key, self.path.display());
        Ok(())
    }
}
