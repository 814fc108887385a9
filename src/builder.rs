use std::sync::Arc;

use crate::config::TransformerConfig;
use crate::error::TransformError;
use crate::pipeline::RecipePipeline;
use crate::providers::{CompletionRequester, GeminiRequester};
use crate::storage::{JsonFileStore, MemoryStore, SettingsStore};

/// Builder for configuring a [`RecipePipeline`]
#[derive(Default)]
pub struct RecipePipelineBuilder {
    config: Option<TransformerConfig>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    store: Option<Arc<dyn SettingsStore>>,
    requester: Option<Box<dyn CompletionRequester>>,
}

impl RecipePipelineBuilder {
    /// Start from a loaded configuration instead of the defaults
    pub fn config(mut self, config: TransformerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the API key directly
    ///
    /// Ignored when a custom store is supplied with [`store`](Self::store).
    ///
    /// # Example
    /// ```
    /// use recipe_transformer::RecipePipeline;
    ///
    /// let pipeline = RecipePipeline::builder()
    ///     .api_key("your-api-key")
    ///     .build();
    /// assert!(pipeline.is_ok());
    /// ```
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the Gemini model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Point the requester at another host (proxies, tests)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use a custom settings store
    pub fn store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom completion requester
    pub fn requester(mut self, requester: Box<dyn CompletionRequester>) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Build the pipeline
    ///
    /// Store selection, first match wins: an explicit store, the configured
    /// `settings_file`, then an in-memory store. The API key from the builder
    /// or the configuration seeds the in-memory store and backs the file
    /// store while the file holds no key.
    pub fn build(self) -> Result<RecipePipeline, TransformError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        let api_key = self.api_key.or_else(|| config.api_key.clone());
        let store: Arc<dyn SettingsStore> = match (self.store, &config.settings_file) {
            (Some(store), _) => store,
            (None, Some(path)) => {
                let store = JsonFileStore::new(path);
                Arc::new(match api_key {
                    Some(key) => store.with_api_key(key),
                    None => store,
                })
            }
            (None, None) => match api_key {
                Some(key) => Arc::new(MemoryStore::with_api_key(key)),
                None => Arc::new(MemoryStore::new()),
            },
        };

        let requester = match self.requester {
            Some(requester) => requester,
            None => Box::new(GeminiRequester::new(&config)?),
        };

        Ok(RecipePipeline::new(&config, requester, store))
    }
}

impl RecipePipeline {
    /// Creates a new builder
    pub fn builder() -> RecipePipelineBuilder {
        RecipePipelineBuilder::default()
    }
}
