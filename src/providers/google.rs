use crate::config::TransformerConfig;
use crate::error::TransformError;
use crate::providers::{CompletionRequester, GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Gemini `generateContent` client
pub struct GeminiRequester {
    client: Client,
    endpoint: String,
}

impl GeminiRequester {
    /// Create a new Gemini requester from configuration
    pub fn new(config: &TransformerConfig) -> Result<Self, TransformError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(GeminiRequester {
            client: builder.build().map_err(TransformError::Network)?,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionRequester for GeminiRequester {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, TransformError> {
        debug!(
            "POST {} ({} prompt chars, maxOutputTokens {})",
            self.endpoint,
            request.prompt().chars().count(),
            request.generation_config.max_output_tokens
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(TransformError::Network)?;

        let status = response.status();
        if !status.is_success() {
            debug!("Gemini API returned {}", status);
            return Err(TransformError::api(status.as_u16()));
        }

        let body = response.text().await.map_err(TransformError::Network)?;
        let mut envelope: GenerationResponse = serde_json::from_str(&body).map_err(|e| {
            TransformError::MalformedResponse(format!("reply body is not a JSON envelope: {}", e))
        })?;
        envelope.raw = body;
        Ok(envelope)
    }
}
