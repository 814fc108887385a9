mod file;
mod history;

pub use file::JsonFileStore;
pub use history::{recent_recipes, record_recent, RecentRecipe, MAX_RECENT};

use crate::error::TransformError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Key under which the Gemini API key is stored
pub const API_KEY: &str = "geminiApiKey";

/// Key for the recently transformed recipes list
pub const RECENT_RECIPES: &str = "recentRecipes";

/// Opaque key-value settings store.
///
/// No cross-call atomicity is offered: two concurrent read-modify-write
/// sequences may interleave.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, TransformError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), TransformError>;
}

/// Read the API key, failing when it is absent, not a string, or blank
pub async fn read_api_key(store: &dyn SettingsStore) -> Result<String, TransformError> {
    match store.get(API_KEY).await? {
        Some(Value::String(key)) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(TransformError::MissingCredential),
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(API_KEY.to_string(), Value::String(api_key.into()));
        }
        store
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, TransformError> {
        let values = self
            .values
            .lock()
            .map_err(|e| TransformError::Storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), TransformError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| TransformError::Storage(e.to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}
