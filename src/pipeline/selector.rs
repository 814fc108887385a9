use crate::error::TransformError;
use crate::providers::{ContentPart, FinishReason, GenerationResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;

/// Outcome of scanning a reply for usable text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Text(String),
    /// Nothing recoverable; carries the first candidate's finish reason
    NotFound { finish_reason: FinishReason },
}

/// Pick the best raw text payload out of `response`.
///
/// A top-level block reason fails immediately. Otherwise the first non-blank
/// text part across all candidates wins, then the first decodable JSON inline
/// data part.
pub fn select_text(response: &GenerationResponse) -> Result<Selection, TransformError> {
    if let Some(reason) = response.block_reason() {
        return Err(TransformError::Blocked {
            reason: reason.to_string(),
        });
    }

    let parts = move || {
        response
            .candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
    };

    if let Some(text) = parts().find_map(text_part) {
        return Ok(Selection::Text(text.to_string()));
    }

    if let Some(decoded) = parts().find_map(inline_json_part) {
        debug!("Using inline_data part ({} bytes decoded)", decoded.len());
        return Ok(Selection::Text(decoded));
    }

    Ok(Selection::NotFound {
        finish_reason: response.first_finish_reason(),
    })
}

fn text_part(part: &ContentPart) -> Option<&str> {
    part.text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
}

fn inline_json_part(part: &ContentPart) -> Option<String> {
    let inline = part.inline_data.as_ref()?;
    let mime_type = inline.mime_type.as_deref()?;
    if !mime_type.to_ascii_lowercase().contains("json") {
        return None;
    }

    let bytes = STANDARD.decode(inline.data.as_deref()?.trim()).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    if decoded.trim().is_empty() {
        None
    } else {
        Some(decoded)
    }
}
