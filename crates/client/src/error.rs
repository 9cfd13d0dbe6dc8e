use serde_json::Value;
use thiserror::Error;

/// Fixed message for failures where no HTTP response was obtained.
pub const TRANSPORT_MESSAGE: &str = "Network error. Please check your connection.";

/// Fallback when an error response carries no usable message field.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Normalized failure shape for every gateway call.
///
/// Either the server rejected the request (real HTTP status plus whatever
/// structured body it sent), or no response was obtained at all — connect
/// failure, DNS, or a success response whose body was not the JSON it
/// should have been. Transport failures report status `0`, which no real
/// HTTP response can carry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Rejection {
        status: u16,
        message: String,
        data: Option<Value>,
    },

    #[error("{TRANSPORT_MESSAGE}")]
    Transport,
}

impl ApiError {
    pub fn rejection(status: u16, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Rejection {
            status,
            message: message.into(),
            data,
        }
    }

    /// HTTP status, or `0` for transport failures.
    pub fn status(&self) -> u16 {
        match self {
            Self::Rejection { status, .. } => *status,
            Self::Transport => 0,
        }
    }

    /// The single displayable string for this failure.
    pub fn message(&self) -> &str {
        match self {
            Self::Rejection { message, .. } => message,
            Self::Transport => TRANSPORT_MESSAGE,
        }
    }

    /// The parsed error body, when the server sent one.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Rejection { data, .. } => data.as_ref(),
            Self::Transport => None,
        }
    }
}

/// Pull a human-readable message out of an error body: `message` first,
/// then `error`.
pub(crate) fn extract_message(body: &Value) -> Option<String> {
    for field in ["message", "error"] {
        if let Some(msg) = body.get(field).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }
    None
}
