// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the request layer and the stores built on top of it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const GENERIC_REQUEST_MESSAGE: &str = "Request failed.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const TIMEOUT_MESSAGE: &str = "The server took too long to respond.";

/// One field-level problem reported by the backend's validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Coarse category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Validation,
    NotFound,
    Server,
    Network,
    /// Any other non-2xx status (403, 409, untagged 400, ...).
    Http,
    /// The request could not be built or the response did not match the envelope.
    Malformed,
}

/// Failure raised by the request gateway and passed through the API client untouched.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Authentication { message: String, body: Value },

    #[error("{message}")]
    Validation {
        message: String,
        issues: Vec<FieldIssue>,
        body: Value,
    },

    #[error("{message}")]
    NotFound { message: String, body: Value },

    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("{message}")]
    Network { message: String, cause: String },

    #[error("{message}")]
    Malformed { status: u16, message: String },
}

impl ApiError {
    /// Build the error for a non-2xx response from its status and parsed body.
    pub fn from_status(status: u16, body: Value) -> Self {
        let message = server_message(&body).unwrap_or_else(|| GENERIC_REQUEST_MESSAGE.to_string());
        match status {
            401 => ApiError::Authentication { message, body },
            400 if is_validation_payload(&body) => {
                let issues = field_issues(&body);
                ApiError::Validation {
                    message,
                    issues,
                    body,
                }
            }
            404 => ApiError::NotFound { message, body },
            s if s >= 500 => ApiError::Server {
                status: s,
                message,
                body,
            },
            s => ApiError::Http {
                status: s,
                message,
                body,
            },
        }
    }

    pub fn network(cause: impl ToString) -> Self {
        ApiError::Network {
            message: NETWORK_MESSAGE.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn timeout(cause: impl ToString) -> Self {
        ApiError::Network {
            message: TIMEOUT_MESSAGE.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Authentication { .. } => ErrorKind::Authentication,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// HTTP status, `0` when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Authentication { .. } => 401,
            ApiError::Validation { .. } => 400,
            ApiError::NotFound { .. } => 404,
            ApiError::Server { status, .. } | ApiError::Http { status, .. } => *status,
            ApiError::Malformed { status, .. } => *status,
            ApiError::Network { .. } => 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Authentication { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Server { message, .. }
            | ApiError::Http { message, .. }
            | ApiError::Network { message, .. }
            | ApiError::Malformed { message, .. } => message,
        }
    }

    /// Raw response payload, if the server sent one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Authentication { body, .. }
            | ApiError::Validation { body, .. }
            | ApiError::NotFound { body, .. }
            | ApiError::Server { body, .. }
            | ApiError::Http { body, .. } => Some(body),
            ApiError::Network { .. } | ApiError::Malformed { .. } => None,
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ApiError::Validation { issues, .. } => issues,
            _ => &[],
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure reported by a store action to its caller. The raw [`ApiError`] never
/// leaves the store; this carries what a form needs to render it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionFailure {
    pub message: String,
    pub status: u16,
    pub issues: Vec<FieldIssue>,
}

impl ActionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 0,
            issues: Vec::new(),
        }
    }

    /// Client-side rejection of a single input field.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self {
            message: message.to_string(),
            status: 400,
            issues: vec![FieldIssue {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }
}

impl From<&ApiError> for ActionFailure {
    fn from(e: &ApiError) -> Self {
        Self {
            message: e.message().to_string(),
            status: e.status(),
            issues: e.issues().to_vec(),
        }
    }
}

impl From<ApiError> for ActionFailure {
    fn from(e: ApiError) -> Self {
        ActionFailure::from(&e)
    }
}

/// Durable storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

fn server_message(body: &Value) -> Option<String> {
    let non_empty = |v: &Value| v.as_str().filter(|s| !s.trim().is_empty()).map(str::to_string);
    body.get("message")
        .and_then(non_empty)
        .or_else(|| body.get("error").and_then(non_empty))
        .or_else(|| {
            body.get("error")
                .and_then(|e| e.get("message"))
                .and_then(non_empty)
        })
}

fn is_validation_payload(body: &Value) -> bool {
    body.get("error")
        .and_then(|e| e.get("type"))
        .and_then(Value::as_str)
        .map(|t| t.eq_ignore_ascii_case("ValidationError") || t.eq_ignore_ascii_case("validation"))
        .unwrap_or(false)
}

/// Collects `error.details` entries. Validators disagree on key names, so
/// `field`/`path`/`param` and `message`/`msg` are all accepted.
fn field_issues(body: &Value) -> Vec<FieldIssue> {
    let Some(details) = body
        .get("error")
        .and_then(|e| e.get("details"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };
    details
        .iter()
        .filter_map(|d| {
            let field = ["field", "path", "param"]
                .iter()
                .find_map(|k| d.get(*k))
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    Value::Array(parts) => parts
                        .iter()
                        .map(|p| p.as_str().map(str::to_string).unwrap_or_else(|| p.to_string()))
                        .collect::<Vec<_>>()
                        .join("."),
                    other => other.to_string(),
                })?;
            let message = ["message", "msg"]
                .iter()
                .find_map(|k| d.get(*k).and_then(Value::as_str))
                .unwrap_or("Invalid value")
                .to_string();
            Some(FieldIssue { field, message })
        })
        .collect()
}
