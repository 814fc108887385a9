use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TransformerConfig {
    /// API key for authentication (can also be set through the settings store)
    pub api_key: Option<String>,
    /// Gemini model identifier
    pub model: String,
    /// Base URL for the API endpoint (for proxies and tests)
    pub base_url: String,
    /// Requested output MIME type; an empty string disables the hint
    pub response_mime_type: String,
    /// Budgets for the first request
    #[serde(deserialize_with = "primary_budget")]
    pub primary: AttemptConfig,
    /// Budgets for the reduced-scope retry
    #[serde(deserialize_with = "retry_budget")]
    pub retry: AttemptConfig,
    /// Request timeout in seconds; unset leaves the transport default
    pub timeout: Option<u64>,
    /// Path of a JSON file used as the settings store
    pub settings_file: Option<String>,
}

/// Size limits for one generation attempt
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AttemptConfig {
    /// Character cap applied to the page body before it is embedded in the prompt
    pub max_input_chars: usize,
    /// Output token cap sent with the request
    pub max_output_tokens: u32,
}

impl AttemptConfig {
    pub fn primary() -> Self {
        Self {
            max_input_chars: 12_000,
            max_output_tokens: 4096,
        }
    }

    pub fn retry() -> Self {
        Self {
            max_input_chars: 8_000,
            max_output_tokens: 3072,
        }
    }
}

/// A partially specified attempt table; unset keys keep the attempt's defaults
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AttemptOverride {
    max_input_chars: Option<usize>,
    max_output_tokens: Option<u32>,
}

impl AttemptOverride {
    fn over(self, base: AttemptConfig) -> AttemptConfig {
        AttemptConfig {
            max_input_chars: self.max_input_chars.unwrap_or(base.max_input_chars),
            max_output_tokens: self.max_output_tokens.unwrap_or(base.max_output_tokens),
        }
    }
}

fn primary_budget<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AttemptConfig, D::Error> {
    AttemptOverride::deserialize(deserializer).map(|o| o.over(AttemptConfig::primary()))
}

fn retry_budget<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AttemptConfig, D::Error> {
    AttemptOverride::deserialize(deserializer).map(|o| o.over(AttemptConfig::retry()))
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            response_mime_type: default_response_mime_type(),
            primary: AttemptConfig::primary(),
            retry: AttemptConfig::retry(),
            timeout: None,
            settings_file: None,
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_response_mime_type() -> String {
    "application/json".to_string()
}

impl TransformerConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_TRANSFORMER__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Retry budget, never larger than the primary one
    pub fn retry_attempt(&self) -> AttemptConfig {
        AttemptConfig {
            max_input_chars: self.retry.max_input_chars.min(self.primary.max_input_chars),
            max_output_tokens: self.retry.max_output_tokens,
        }
    }

    pub fn mime_type_hint(&self) -> Option<&str> {
        let trimmed = self.response_mime_type.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Load configuration from file and environment variables
///
/// Environment variable format: RECIPE_TRANSFORMER__PRIMARY__MAX_INPUT_CHARS
pub fn load_config() -> Result<TransformerConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

fn environment() -> Environment {
    Environment::with_prefix("RECIPE_TRANSFORMER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
