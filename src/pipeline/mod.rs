pub mod prompt;
pub mod repair;
pub mod retry;
pub mod selector;
pub mod validator;

use crate::config::{AttemptConfig, TransformerConfig};
use crate::error::TransformError;
use crate::model::{ContentPayload, RecipeRecord, TransformReply};
use crate::providers::{CompletionRequester, GenerationRequest, GenerationResponse};
use crate::storage::{read_api_key, SettingsStore};
use log::{debug, info, warn};
use prompt::{build_prompt, PromptKind};
use retry::RetryDecision;
use selector::Selection;
use std::sync::Arc;

/// Outcome of an API key check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCheck {
    pub is_valid: bool,
    pub error: Option<String>,
}

/// Page content → prompt → Gemini → repaired, validated JSON-LD recipe
pub struct RecipePipeline {
    requester: Box<dyn CompletionRequester>,
    store: Arc<dyn SettingsStore>,
    primary: AttemptConfig,
    retry: AttemptConfig,
    response_mime_type: Option<String>,
}

impl RecipePipeline {
    pub fn new(
        config: &TransformerConfig,
        requester: Box<dyn CompletionRequester>,
        store: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            requester,
            store,
            primary: config.primary,
            retry: config.retry_attempt(),
            response_mime_type: config.mime_type_hint().map(str::to_string),
        }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Run one invocation, converting any failure into the reply shape
    pub async fn handle(&self, payload: &ContentPayload) -> TransformReply {
        match self.transform(payload).await {
            Ok(recipe) => TransformReply::success(recipe),
            Err(e) => {
                warn!("Recipe transform failed [{}]: {}", e.code(), e);
                TransformReply::failure(e.to_string())
            }
        }
    }

    /// Run one invocation of the pipeline
    ///
    /// At most two requests are issued: the primary one and, only when the
    /// primary reply was cut off at the output cap without any usable text,
    /// a single reduced-scope retry.
    pub async fn transform(&self, payload: &ContentPayload) -> Result<RecipeRecord, TransformError> {
        let api_key = read_api_key(self.store.as_ref()).await?;

        let primary = self
            .request(&api_key, PromptKind::Primary, payload, self.primary)
            .await?;

        let text = match selector::select_text(&primary)? {
            Selection::Text(text) => text,
            Selection::NotFound { finish_reason } => {
                warn!(
                    "No text in Gemini reply (finishReason: {}): {}",
                    finish_reason,
                    envelope_preview(&primary)
                );
                if retry::decide(&finish_reason) == RetryDecision::GiveUp {
                    return Err(TransformError::NoContent { finish_reason });
                }

                info!("Retrying once with the concise prompt");
                let retried = self
                    .request(&api_key, PromptKind::Retry, payload, self.retry)
                    .await?;
                match selector::select_text(&retried)? {
                    Selection::Text(text) => text,
                    Selection::NotFound { .. } => {
                        return Err(TransformError::NoContent { finish_reason })
                    }
                }
            }
        };

        let extracted = repair::extract_json(&text)?;
        debug!(
            "Parsed {:?} span (fenced: {}, repaired: {})",
            extracted.span, extracted.fenced, extracted.repaired
        );

        let report = validator::validate(&extracted.value);
        if !report.is_valid {
            warn!("Recipe failed validation: {:?}", report.errors);
            return Err(TransformError::ValidationFailed(report.errors));
        }

        serde_json::from_value(extracted.value)
            .map_err(|e| TransformError::ValidationFailed(vec![e.to_string()]))
    }

    /// Send a minimal request to find out whether `api_key` is accepted
    pub async fn check_api_key(&self, api_key: &str) -> KeyCheck {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return KeyCheck {
                is_valid: false,
                error: Some("API key is empty".to_string()),
            };
        }
        if !api_key.starts_with("AIza") {
            warn!("API key does not look like a Gemini key");
        }

        let request = GenerationRequest::new("Test message", 10, None);
        let error = match self.requester.generate(api_key, &request).await {
            Ok(_) => None,
            Err(TransformError::Api {
                status: 401 | 403, ..
            }) => Some("Invalid API key".to_string()),
            Err(TransformError::Api { status, .. }) => Some(format!("API Error: {}", status)),
            Err(TransformError::Network(_)) => Some("Network error during validation".to_string()),
            // Any reply at all means the key was accepted
            Err(_) => None,
        };

        KeyCheck {
            is_valid: error.is_none(),
            error,
        }
    }

    async fn request(
        &self,
        api_key: &str,
        kind: PromptKind,
        payload: &ContentPayload,
        attempt: AttemptConfig,
    ) -> Result<GenerationResponse, TransformError> {
        let prompt = build_prompt(kind, payload, attempt.max_input_chars);
        let request = GenerationRequest::new(
            prompt,
            attempt.max_output_tokens,
            self.response_mime_type.as_deref(),
        );
        debug!(
            "Sending {:?} request via {}",
            kind,
            self.requester.provider_name()
        );
        self.requester.generate(api_key, &request).await
    }
}

/// First 1200 chars of the reply body, or of its parsed form when no body was kept
fn envelope_preview(response: &GenerationResponse) -> String {
    if response.raw.is_empty() {
        format!("{:?}", response).chars().take(1200).collect()
    } else {
        response.raw.chars().take(1200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FinishReason;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every request
    struct ScriptedRequester {
        replies: Mutex<VecDeque<Result<Value, u16>>>,
        seen: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    #[async_trait]
    impl CompletionRequester for ScriptedRequester {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _api_key: &str,
            request: &GenerationRequest,
        ) -> Result<GenerationResponse, TransformError> {
            self.seen.lock().unwrap().push(request.clone());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(body)) => Ok(serde_json::from_value(body).unwrap()),
                Some(Err(status)) => Err(TransformError::api(status)),
                None => panic!("unexpected extra request"),
            }
        }
    }

    fn pipeline(
        replies: Vec<Result<Value, u16>>,
    ) -> (RecipePipeline, Arc<Mutex<Vec<GenerationRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let requester = ScriptedRequester {
            replies: Mutex::new(replies.into()),
            seen: seen.clone(),
        };
        let pipeline = RecipePipeline::new(
            &TransformerConfig::default(),
            Box::new(requester),
            Arc::new(MemoryStore::with_api_key("AIzaTest")),
        );
        (pipeline, seen)
    }

    fn text_reply(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] }, "finishReason": "STOP" }] })
    }

    const RECIPE: &str = r#"{"@context":"https://schema.org/","@type":"Recipe","name":"Toast",
        "recipeIngredient":["1 slice bread"],"recipeInstructions":[{"@type":"HowToStep","text":"Toast."}]}"#;

    #[tokio::test]
    async fn test_single_request_on_success() {
        let (pipeline, seen) = pipeline(vec![Ok(text_reply(RECIPE))]);
        let recipe = pipeline
            .transform(&ContentPayload::new("Toast", "bread"))
            .await
            .unwrap();

        assert_eq!(recipe.name, "Toast");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].generation_config.temperature, 0.0);
        assert_eq!(seen[0].generation_config.max_output_tokens, 4096);
        assert_eq!(
            seen[0].generation_config.response_mime_type.as_deref(),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_max_tokens_retries_once_with_reduced_prompt() {
        let body = "x".repeat(10_000);
        let (pipeline, seen) = pipeline(vec![
            Ok(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] })),
            Ok(text_reply(RECIPE)),
        ]);
        pipeline
            .transform(&ContentPayload::new("Toast", body.clone()))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].prompt().contains(&body));
        assert!(seen[1].prompt().contains("Max 30 ingredients and 30 steps"));
        assert!(seen[1].prompt().contains(&"x".repeat(8_000)));
        assert!(!seen[1].prompt().contains(&"x".repeat(8_001)));
        assert_eq!(seen[1].generation_config.max_output_tokens, 3072);
    }

    #[tokio::test]
    async fn test_retry_without_text_reports_primary_finish_reason() {
        let (pipeline, seen) = pipeline(vec![
            Ok(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] })),
            Ok(json!({ "candidates": [{ "finishReason": "STOP" }] })),
        ]);
        let err = pipeline.transform(&ContentPayload::default()).await.unwrap_err();

        match err {
            TransformError::NoContent { finish_reason } => {
                assert_eq!(finish_reason, FinishReason::MaxTokens)
            }
            other => panic!("expected NoContent, got {:?}", other),
        }
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_other_finish_reasons_do_not_retry() {
        for reply in [
            json!({ "candidates": [{ "finishReason": "STOP" }] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{}] }),
            json!({}),
        ] {
            let (pipeline, seen) = pipeline(vec![Ok(reply)]);
            let err = pipeline.transform(&ContentPayload::default()).await.unwrap_err();
            assert!(matches!(err, TransformError::NoContent { .. }));
            assert_eq!(seen.lock().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_block_reason_never_retries() {
        let (pipeline, seen) = pipeline(vec![Ok(json!({
            "promptFeedback": { "blockReason": "OTHER" },
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))]);
        let reply = pipeline.handle(&ContentPayload::default()).await;

        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("Model blocked: OTHER"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_api_error_is_terminal() {
        let (pipeline, seen) = pipeline(vec![
            Ok(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] })),
            Err(503),
        ]);
        let err = pipeline.transform(&ContentPayload::default()).await.unwrap_err();
        assert!(matches!(err, TransformError::Api { status: 503, .. }));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_key_sends_nothing() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = RecipePipeline::new(
            &TransformerConfig::default(),
            Box::new(ScriptedRequester {
                replies: Mutex::new(VecDeque::new()),
                seen: seen.clone(),
            }),
            Arc::new(MemoryStore::new()),
        );

        let reply = pipeline.handle(&ContentPayload::default()).await;
        assert!(!reply.success);
        assert!(reply.error.unwrap().contains("No API key found"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failures_are_listed() {
        let (pipeline, _) = pipeline(vec![Ok(text_reply(
            r#"{"@context":"https://schema.org/","@type":"Recipe","name":" ","recipeIngredient":[],"recipeInstructions":["Eat."]}"#,
        ))]);
        let err = pipeline.transform(&ContentPayload::default()).await.unwrap_err();

        match err {
            TransformError::ValidationFailed(errors) => assert_eq!(
                errors,
                vec![
                    "Recipe name is missing or empty",
                    "Recipe ingredients are missing or empty"
                ]
            ),
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_reply() {
        let (pipeline, _) = pipeline(vec![Ok(text_reply("Sorry, no recipe here."))]);
        let reply = pipeline.handle(&ContentPayload::default()).await;
        assert!(reply
            .error
            .unwrap()
            .starts_with("Invalid JSON response from AI: "));
    }

    #[tokio::test]
    async fn test_check_api_key() {
        let (pipeline, seen) = pipeline(vec![Ok(json!({})), Err(403), Err(500)]);

        assert_eq!(
            pipeline.check_api_key("  ").await,
            KeyCheck { is_valid: false, error: Some("API key is empty".to_string()) }
        );
        assert!(pipeline.check_api_key("AIzaGood").await.is_valid);
        assert_eq!(
            pipeline.check_api_key("AIzaBad").await.error.as_deref(),
            Some("Invalid API key")
        );
        assert_eq!(
            pipeline.check_api_key("AIzaBusy").await.error.as_deref(),
            Some("API Error: 500")
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].generation_config.max_output_tokens, 10);
    }

    #[test]
    fn test_envelope_preview_uses_raw_body() {
        let response = GenerationResponse {
            raw: format!("{{\"candidates\":[]}}{}", "x".repeat(2000)),
            ..Default::default()
        };
        let preview = envelope_preview(&response);
        assert!(preview.starts_with("{\"candidates\":[]}"));
        assert_eq!(preview.chars().count(), 1200);
    }
}
