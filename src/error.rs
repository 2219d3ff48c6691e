//! Typed errors: catalog/settings problems and request failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Failure of a controller operation. Every variant is non-fatal: the caller may
/// re-issue the action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Rejected input, either by the local field rules or by the backend (400/422).
    /// Form state should be kept so the user can correct it.
    #[error("validation: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },
    /// Transport failure, unexpected status or malformed response body.
    #[error("network: {0}")]
    Network(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation { .. })
    }

    /// Message suitable for a toast or inline form error.
    pub fn user_message(&self) -> &str {
        match self {
            ClientError::Validation { message, .. } => message,
            ClientError::Network(m) => m,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_keep_the_field_name() {
        let e = ClientError::field("name", "name is required");
        assert!(e.is_validation());
        assert_eq!(e.user_message(), "name is required");
        assert_eq!(e.to_string(), "validation: name is required");
        match e {
            ClientError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("name")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn network_errors_are_not_validation() {
        let e = ClientError::Network("503 Service Unavailable".into());
        assert!(!e.is_validation());
        assert_eq!(e.user_message(), "503 Service Unavailable");
    }
}
