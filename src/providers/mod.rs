mod google;
mod types;

pub use google::GeminiRequester;
pub use types::{
    Candidate, CandidateContent, ContentPart, FinishReason, GenerationOptions, GenerationRequest,
    GenerationResponse, InlineData, PromptFeedback, RequestContent, RequestPart,
};

use crate::error::TransformError;
use async_trait::async_trait;

/// Performs one call to a text-generation endpoint.
///
/// Implementations issue exactly one outbound request per call and never
/// retry on their own; retry policy belongs to the pipeline.
#[async_trait]
pub trait CompletionRequester: Send + Sync {
    /// Get the provider name (e.g., "google")
    fn provider_name(&self) -> &str;

    /// Send `request` authenticated with `api_key` and parse the reply envelope
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, TransformError>;
}
