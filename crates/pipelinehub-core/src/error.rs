//! Error types for PipelineHub.

use serde::{Deserialize, Serialize};

/// A field-level rejection reported by the record API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Human-readable label of the offending field
    pub field_label: String,
    /// What the backend objected to
    pub message: String,
}

/// One record of a batch operation that the backend refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Record-level message, if the backend sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field-level errors, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl RecordFailure {
    /// Creates a failure carrying only a record-level message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    /// Messages suitable for one transient notification each.
    ///
    /// Field errors come first as `"<label>: <message>"`, followed by the
    /// record-level message.
    pub fn messages(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field_label, e.message))
            .collect();
        if let Some(message) = &self.message {
            out.push(message.clone());
        }
        out
    }
}

/// Errors that can occur while talking to the record API or deriving views.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The backend answered with `success: false`.
    #[error("API error: {message}")]
    Api {
        /// Message returned by the backend
        message: String,
    },

    /// Every record of a batch was refused.
    #[error("{entity} rejected: {} record(s) failed", .failures.len())]
    Rejected {
        /// Entity name (e.g. "deal")
        entity: String,
        /// Per-record failures in submission order
        failures: Vec<RecordFailure>,
    },

    /// A by-id lookup returned no data.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name
        entity: String,
        /// Requested identifier
        id: String,
    },

    /// Client-side validation failed before any network call.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The request never produced a backend response.
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A wait did not finish in time.
    #[error("Timed out: {message}")]
    Timeout {
        /// What was being waited on
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error (config files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type alias for PipelineHub operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is transient.
    ///
    /// Nothing retries automatically; callers use this to word notifications.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::Timeout { .. } => true,
            Error::Io(_) => true,
            Error::Api { .. } => false,
            Error::Rejected { .. } => false,
            Error::NotFound { .. } => false,
            Error::Validation { .. } => false,
            Error::Serialization(_) => false,
            Error::Config { .. } => false,
        }
    }

    /// Creates a backend failure error.
    pub fn api<S: Into<String>>(message: S) -> Self {
        Error::Api {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a transport error without a source.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error with a source error.
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a timeout error.
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Error::Timeout {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Messages to surface to the user, one notification each.
    ///
    /// A rejected batch yields every per-record message individually; every
    /// other error yields its display string.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Error::Rejected { failures, .. } => {
                let messages: Vec<String> =
                    failures.iter().flat_map(RecordFailure::messages).collect();
                if messages.is_empty() {
                    vec![self.to_string()]
                } else {
                    messages
                }
            }
            Error::Api { message } => vec![message.clone()],
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::api("Table not found");
        assert_eq!(err.to_string(), "API error: Table not found");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::transport("connection reset").is_retryable());
        assert!(!Error::api("bad request").is_retryable());
        assert!(!Error::validation("test").is_retryable());
        assert!(!Error::not_found("deal", 7).is_retryable());
        assert!(Error::timeout("deal store still loading").is_retryable());
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::timeout("contact store still loading after 10ms");
        assert_eq!(err.to_string(), "Timed out: contact store still loading after 10ms");
    }

    #[test]
    fn test_validation_error_with_field() {
        let err = Error::validation_field("email", "must not be empty");
        let Error::Validation { field, message } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field, Some("email".to_string()));
        assert_eq!(message, "must not be empty");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("contact", 42);
        assert_eq!(err.to_string(), "contact not found: 42");
    }

    #[test]
    fn test_rejected_display_counts_failures() {
        let err = Error::Rejected {
            entity: "quote".to_string(),
            failures: vec![RecordFailure::with_message("a"), RecordFailure::default()],
        };
        assert_eq!(err.to_string(), "quote rejected: 2 record(s) failed");
    }

    #[test]
    fn test_user_messages_expand_field_errors() {
        let err = Error::Rejected {
            entity: "quote".to_string(),
            failures: vec![RecordFailure {
                message: Some("Record invalid".to_string()),
                errors: vec![FieldError {
                    field_label: "Title".to_string(),
                    message: "is required".to_string(),
                }],
            }],
        };
        assert_eq!(
            err.user_messages(),
            vec!["Title: is required".to_string(), "Record invalid".to_string()]
        );
    }

    #[test]
    fn test_user_messages_api_uses_raw_message() {
        assert_eq!(Error::api("Quota exceeded").user_messages(), vec!["Quota exceeded"]);
    }

    #[test]
    fn test_transport_with_source() {
        let io_error = std::io::Error::other("network failure");
        let err = Error::transport_with_source("fetch failed", io_error);
        assert!(err.to_string().contains("fetch failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_serde_error_not_retryable() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{oops}").unwrap_err();
        let err: Error = serde_err.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn test_record_failure_deserializes_wire_shape() {
        let json = r#"{"message":"bad","errors":[{"fieldLabel":"Email","message":"invalid"}]}"#;
        let failure: RecordFailure = serde_json::from_str(json).unwrap();
        assert_eq!(failure.messages(), vec!["Email: invalid", "bad"]);
    }
}
