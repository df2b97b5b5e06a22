pub mod completion;

use serde_json::Value;
use thiserror::Error;

/// Sampling temperature used when the client supplies nothing usable.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Token budget used when the client supplies no numeric hint.
pub const DEFAULT_MAX_TOKENS: u32 = 800;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion API returned status {status}: {body}")]
    Upstream {
        status: u16,
        body: String,
    },
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Resolve the client-supplied temperature into the value actually sent
/// upstream. Numbers pass through, non-empty numeric strings are parsed,
/// anything else falls back to the default. The result is always clamped
/// into [0, 1].
pub fn resolve_temperature(value: Option<&Value>) -> f64 {
    let supplied = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok().filter(|t| !t.is_nan())
            }
        }
        _ => None,
    };
    supplied.unwrap_or(DEFAULT_TEMPERATURE).clamp(0.0, 1.0)
}

/// Resolve the max-token hint. Only plain numbers are honored; strings are
/// not parsed here, unlike temperatures.
pub fn resolve_max_tokens(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .map(|n| n as u32)
        .unwrap_or(DEFAULT_MAX_TOKENS)
}
