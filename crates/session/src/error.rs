use thiserror::Error;

use servicehub_common::ValidationError;

/// Failures surfaced by session operations. Every variant reduces to a
/// single displayable string via `Display` — callers render it inline,
/// never a raw response body.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Input rejected before any network dispatch.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Login or register rejected; the gateway error has already been
    /// reduced to its displayable message.
    #[error("{0}")]
    Auth(String),

    /// The durable store could not be written.
    #[error("failed to persist session: {0}")]
    Storage(#[from] servicehub_vault::Error),

    /// The profile snapshot could not be serialized.
    #[error("failed to encode profile snapshot")]
    Encode(#[source] serde_json::Error),
}

impl SessionError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
