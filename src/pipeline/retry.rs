use crate::providers::FinishReason;

/// What to do after the primary attempt yielded no text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Send one reduced-scope request
    Retry,
    GiveUp,
}

/// Only a completion cut off by the output cap earns a second attempt.
///
/// A missing finish reason arrives here as [`FinishReason::Unknown`] and is
/// not eligible.
pub fn decide(finish_reason: &FinishReason) -> RetryDecision {
    match finish_reason {
        FinishReason::MaxTokens => RetryDecision::Retry,
        _ => RetryDecision::GiveUp,
    }
}
