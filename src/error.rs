use thiserror::Error;

use crate::providers::FinishReason;

/// Errors that can occur while turning page content into a recipe
#[derive(Error, Debug)]
pub enum TransformError {
    /// No API key in the settings store
    #[error("No API key found. Please configure your Gemini API key in extension options.")]
    MissingCredential,

    /// The request never produced an HTTP response
    #[error("Network error: unable to connect to the Gemini API. Check your internet connection. ({0})")]
    Network(#[source] reqwest::Error),

    /// The Gemini API answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The service refused to answer for safety or policy reasons
    #[error("Model blocked: {reason}")]
    Blocked { reason: String },

    /// No text could be recovered from the reply, even after a retry
    #[error("No text content found in Gemini response (finishReason: {finish_reason})")]
    NoContent { finish_reason: FinishReason },

    /// Every JSON repair strategy failed
    #[error("Invalid JSON response from AI: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// JSON parsed but does not describe a usable recipe
    #[error("Recipe validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// The reply body was not a generation envelope
    #[error("Unexpected Gemini response: {0}")]
    MalformedResponse(String),

    /// Settings store could not be read or written
    #[error("Settings storage error: {0}")]
    Storage(String),

    /// The page had nothing readable in it
    #[error("Content extraction failed: {0}")]
    ContentExtraction(String),

    /// Failed to fetch a page
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl TransformError {
    /// Build an [`TransformError::Api`] with the user-facing message for `status`.
    pub fn api(status: u16) -> Self {
        let message = match status {
            401 | 403 => "Invalid API key. Please check your Gemini API key in settings.".to_string(),
            429 => "API quota exceeded. Please try again later or check your Gemini API limits."
                .to_string(),
            400 => "Bad request to API. The recipe content may be too large or malformed."
                .to_string(),
            500 | 502 | 503 => {
                "API service temporarily unavailable. Please try again in a few minutes."
                    .to_string()
            }
            other => format!("API request failed with status {}", other),
        };
        TransformError::Api { status, message }
    }

    /// Stable machine-readable code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::MissingCredential => "API_KEY_MISSING",
            TransformError::Network(_) => "NETWORK_ERROR",
            TransformError::Api { status: 401 | 403, .. } => "API_KEY_INVALID",
            TransformError::Api { status: 429, .. } => "QUOTA_EXCEEDED",
            TransformError::Api { .. } => "API_REQUEST_FAILED",
            TransformError::Blocked { .. } => "MODEL_BLOCKED",
            TransformError::NoContent { .. } => "NO_CONTENT",
            TransformError::InvalidJson(_) => "JSON_PARSE_FAILED",
            TransformError::ValidationFailed(_) => "VALIDATION_FAILED",
            TransformError::MalformedResponse(_) => "INVALID_RESPONSE",
            TransformError::Storage(_) => "STORAGE_ERROR",
            TransformError::ContentExtraction(_) => "CONTENT_EXTRACTION_FAILED",
            TransformError::Fetch(_) => "FETCH_FAILED",
            TransformError::Io(_) => "IO_ERROR",
            TransformError::Config(_) => "CONFIG_ERROR",
        }
    }
}
