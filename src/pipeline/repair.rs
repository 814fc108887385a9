//! Recover a JSON value from a model completion.
//!
//! Completions arrive wrapped in markdown fences, surrounded by prose, or
//! with typographic quotes and trailing commas. Strategies run in a fixed
//! order and the first one that parses wins:
//!
//! 1. keep only the interior of the first fenced code block, if any
//! 2. drop a leading byte-order mark and surrounding whitespace
//! 3. parse the first `{` .. last `}` span, then the repaired span
//! 4. with no object span, the same for the first `[` .. last `]` span
//! 5. with no bracket span at all, the whole text, then the repaired text

use crate::error::TransformError;
use serde_json::Value;

/// Which slice of the text produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Object,
    Array,
    Whole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedJson {
    pub value: Value,
    pub span: Span,
    /// The text came out of a fenced code block
    pub fenced: bool,
    /// Quote or trailing-comma repair was needed
    pub repaired: bool,
}

/// Parse `text` into a JSON value, or fail with the last parse error.
pub fn extract_json(text: &str) -> Result<ExtractedJson, TransformError> {
    let (text, fenced) = match fenced_block(text) {
        Some(inner) => (inner, true),
        None => (text, false),
    };
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text).trim();

    let (candidate, span) = if let Some(object) = bracket_span(text, '{', '}') {
        (object, Span::Object)
    } else if let Some(array) = bracket_span(text, '[', ']') {
        (array, Span::Array)
    } else {
        (text, Span::Whole)
    };

    let (value, repaired) = parse_with_repair(candidate)?;
    Ok(ExtractedJson {
        value,
        span,
        fenced,
        repaired,
    })
}

/// Normalise smart quotes and drop commas right before `}` or `]`.
pub fn repair(text: &str) -> String {
    let normalized: Vec<char> = text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let mut out = String::with_capacity(text.len());
    for (i, &c) in normalized.iter().enumerate() {
        if c == ',' {
            let next = normalized[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn parse_with_repair(candidate: &str) -> Result<(Value, bool), TransformError> {
    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok((value, false));
    }
    serde_json::from_str(&repair(candidate))
        .map(|value| (value, true))
        .map_err(TransformError::InvalidJson)
}

/// Interior of the first triple-backtick block, skipping an optional `json`
/// or `ld+json` tag. Empty blocks count as absent.
fn fenced_block(text: &str) -> Option<&str> {
    const FENCE: &str = "```";

    let open = text.find(FENCE)?;
    let mut rest = &text[open + FENCE.len()..];
    for tag in ["json", "ld+json"] {
        if let Some(stripped) = strip_prefix_ignore_case(rest, tag) {
            rest = stripped;
            break;
        }
    }
    let rest = rest.trim_start();
    let close = rest.find(FENCE)?;
    let inner = &rest[..close];

    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn bracket_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
