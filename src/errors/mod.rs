//! Error handling module for the labdesk client.
//!
//! Provides one error type covering transport, authentication, validation,
//! conflict and not-found failures, with mapping from backend HTTP responses.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Field name to messages, as reported by the backend on 422.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Client error type.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Network or transport failure, no response received
    Transport(String),
    /// Missing, expired or rejected bearer token (401)
    Unauthorized(String),
    /// Authenticated but not allowed (403)
    Forbidden(String),
    /// Field-level validation failure, local or from the backend (422)
    Validation {
        message: String,
        fields: FieldErrors,
    },
    /// Business-rule conflict such as a duplicate DOI (409)
    Conflict(String),
    /// Resource not found (404)
    NotFound(String),
    /// Any other non-success status
    Http { status: u16, message: String },
    /// Response body could not be decoded
    Decode(String),
    /// Persisted session storage failure
    Storage(String),
    /// Invalid configuration
    Config(String),
}

/// Error body shape returned by the backend.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<FieldErrors>,
}

impl ClientError {
    /// Build a validation error for a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        ClientError::Validation { message, fields }
    }

    /// Map a non-success HTTP status and its raw body to an error.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation {
                message,
                fields: parsed.errors.unwrap_or_default(),
            },
            _ => ClientError::Http {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => codes::TRANSPORT_ERROR,
            ClientError::Unauthorized(_) => codes::UNAUTHORIZED,
            ClientError::Forbidden(_) => codes::FORBIDDEN,
            ClientError::Validation { .. } => codes::VALIDATION_ERROR,
            ClientError::Conflict(_) => codes::CONFLICT,
            ClientError::NotFound(_) => codes::NOT_FOUND,
            ClientError::Http { .. } => codes::HTTP_ERROR,
            ClientError::Decode(_) => codes::DECODE_ERROR,
            ClientError::Storage(_) => codes::STORAGE_ERROR,
            ClientError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ClientError::Transport(msg) => msg.clone(),
            ClientError::Unauthorized(msg) => msg.clone(),
            ClientError::Forbidden(msg) => msg.clone(),
            ClientError::Validation { message, fields } => {
                if fields.is_empty() {
                    return message.clone();
                }
                let details: Vec<String> = fields
                    .iter()
                    .map(|(field, msgs)| format!("{}: {}", field, msgs.join(", ")))
                    .collect();
                format!("{} ({})", message, details.join("; "))
            }
            ClientError::Conflict(msg) => msg.clone(),
            ClientError::NotFound(msg) => msg.clone(),
            ClientError::Http { status, message } => format!("HTTP {}: {}", status, message),
            ClientError::Decode(msg) => msg.clone(),
            ClientError::Storage(msg) => msg.clone(),
            ClientError::Config(msg) => msg.clone(),
        }
    }

    /// True when the error must tear the session down.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            tracing::error!("Decode error: {:?}", err);
            return ClientError::Decode(format!("Invalid response body: {}", err));
        }
        tracing::error!("Transport error: {:?}", err);
        ClientError::Transport(format!("Network error: {}", err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ClientError::Decode(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage error: {:?}", err);
        ClientError::Storage(format!("Storage error: {}", err))
    }
}
