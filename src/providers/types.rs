//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Every field in the reply envelope is optional: the service omits parts,
//! finish reasons and feedback freely, and callers fall back explicitly.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Outbound request body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationRequest {
    pub contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationOptions,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestPart {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

impl GenerationRequest {
    /// Single-part request at temperature 0.0
    pub fn new(
        prompt: impl Into<String>,
        max_output_tokens: u32,
        response_mime_type: Option<&str>,
    ) -> Self {
        GenerationRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.into(),
                }],
            }],
            generation_config: GenerationOptions {
                temperature: 0.0,
                max_output_tokens,
                response_mime_type: response_mime_type.map(str::to_string),
            },
        }
    }

    /// Text of the (only) prompt part
    pub fn prompt(&self) -> &str {
        self.contents
            .first()
            .and_then(|content| content.parts.first())
            .map(|part| part.text.as_str())
            .unwrap_or("")
    }
}

/// Parsed reply envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback", alias = "prompt_feedback")]
    pub prompt_feedback: Option<PromptFeedback>,
    /// Reply body as received, when the requester kept it
    #[serde(skip)]
    pub raw: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(
        default,
        rename = "finishReason",
        alias = "finish_reason",
        deserialize_with = "lenient_string"
    )]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default, deserialize_with = "lenient_list")]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, rename = "inline_data", alias = "inlineData")]
    pub inline_data: Option<InlineData>,
}

/// Base64 payload tagged with a MIME type
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InlineData {
    #[serde(
        default,
        rename = "mime_type",
        alias = "mimeType",
        deserialize_with = "lenient_string"
    )]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptFeedback {
    #[serde(
        default,
        rename = "blockReason",
        alias = "block_reason",
        deserialize_with = "lenient_string"
    )]
    pub block_reason: Option<String>,
}

impl GenerationResponse {
    /// Top-level block reason, if the service reported a non-empty one
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
            .filter(|reason| !reason.trim().is_empty())
    }

    /// Finish reason of the first candidate, `Unknown` when absent
    pub fn first_finish_reason(&self) -> FinishReason {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
            .map(FinishReason::from_wire)
            .unwrap_or(FinishReason::Unknown)
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    /// Output hit the token cap
    MaxTokens,
    /// Safety, recitation or policy stop
    Blocked(String),
    Other(String),
    /// No candidate, or the candidate carried no finish reason
    Unknown,
}

const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "IMAGE_SAFETY",
];

impl FinishReason {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim() {
            "" => FinishReason::Unknown,
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            other if BLOCKED_FINISH_REASONS.contains(&other) => {
                FinishReason::Blocked(other.to_string())
            }
            other => FinishReason::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => f.write_str("STOP"),
            FinishReason::MaxTokens => f.write_str("MAX_TOKENS"),
            FinishReason::Blocked(reason) | FinishReason::Other(reason) => f.write_str(reason),
            FinishReason::Unknown => f.write_str("unknown"),
        }
    }
}

/// Accept any JSON value, keeping it only when it is a string
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Accept any JSON value as a list, dropping elements that do not fit `T`
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
