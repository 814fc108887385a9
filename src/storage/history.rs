use crate::error::TransformError;
use crate::storage::{SettingsStore, RECENT_RECIPES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Most entries kept in the recent list
pub const MAX_RECENT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentRecipe {
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub time: u64,
}

/// Read the recent list; unreadable entries are skipped
pub async fn recent_recipes(store: &dyn SettingsStore) -> Result<Vec<RecentRecipe>, TransformError> {
    Ok(match store.get(RECENT_RECIPES).await? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Put `name` at the front of the recent list, dropping older duplicates.
pub async fn record_recent(
    store: &dyn SettingsStore,
    name: &str,
) -> Result<Vec<RecentRecipe>, TransformError> {
    let name = match name.trim() {
        "" => "Untitled Recipe",
        trimmed => trimmed,
    };
    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    let mut list = recent_recipes(store).await?;
    list.retain(|entry| entry.name != name);
    list.insert(
        0,
        RecentRecipe {
            name: name.to_string(),
            time,
        },
    );
    list.truncate(MAX_RECENT);

    let value =
        serde_json::to_value(&list).map_err(|e| TransformError::Storage(e.to_string()))?;
    store.set(RECENT_RECIPES, value).await?;
    Ok(list)
}
