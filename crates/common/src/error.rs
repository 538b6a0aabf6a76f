use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::ProviderKind;

/// Failure of a single provider attempt. Never surfaced to callers on its own;
/// the resolver only uses it to advance to the next source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("unsupported request: {0}")]
    Unsupported(String),
}

/// One failed step of a cascade, kept for observability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAttempt {
    pub provider: ProviderKind,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no data source available for {request} (tried: {})", describe_attempts(.attempts))]
    AllSourcesExhausted {
        request: String,
        attempts: Vec<SourceAttempt>,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_attempts(attempts: &[SourceAttempt]) -> String {
    if attempts.is_empty() {
        return "none configured".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
