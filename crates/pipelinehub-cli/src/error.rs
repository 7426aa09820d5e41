//! Error types for pipelinehub-cli

use thiserror::Error;

/// Result type alias for pipelinehub-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pipelinehub-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from pipelinehub-core
    #[error(transparent)]
    Core(#[from] pipelinehub_core::Error),

    /// Error from pipelinehub-client
    #[error(transparent)]
    Client(#[from] pipelinehub_client::Error),

    /// A store could not load its records
    #[error("Failed to load {entity}: {message}")]
    Load {
        /// Plural entity name
        entity: String,
        /// Load error message
        message: String,
    },

    /// Writing output failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// JSON rendering failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Core(pipelinehub_core::Error::config(message))
    }

    /// Creates a usage error for a bad argument.
    pub fn usage(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Core(pipelinehub_core::Error::validation_field(field, message))
    }
}
