//! Token estimation and footer formatting.
//!
//! `EstimateTokens` is a stable O(1) heuristic shared by the Query
//! Engine, Graph Engine, and Response Shaper. It is intentionally never
//! replaced with a real tokenizer: the point is a deterministic result
//! across platforms, not precision.

/// Estimate the number of tokens in `text`, roughly 4 characters per
/// token, floored at 1 for any non-empty input.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.len().div_ceil(4).max(1)
}

/// Format the trailing `~N tokens` footer every non-error response ends
/// with.
pub fn token_footer(estimated_tokens: usize) -> String {
    format!("~{estimated_tokens} tokens")
}
