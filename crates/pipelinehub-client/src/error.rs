//! Error types for pipelinehub-client

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipelinehub-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pipelinehub-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from pipelinehub-core
    #[error("Core error: {0}")]
    Core(#[from] pipelinehub_core::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status and no API envelope
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Config file could not be parsed
    #[error("Failed to parse {}: {source}", path.display())]
    ConfigParse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// Config could not be rendered as TOML
    #[error("Failed to render config: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// I/O error with the path involved
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<Error> for pipelinehub_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            Error::Http(e) if e.is_decode() => {
                pipelinehub_core::Error::api(format!("malformed response: {e}"))
            }
            Error::Http(e) => pipelinehub_core::Error::transport_with_source("request failed", e),
            Error::Status { status, body } => {
                pipelinehub_core::Error::api(format!("HTTP {status}: {body}"))
            }
            e @ (Error::ConfigParse { .. } | Error::ConfigRender(_)) => {
                pipelinehub_core::Error::config(e.to_string())
            }
            Error::Io { source, .. } => pipelinehub_core::Error::Io(source),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_api_error() {
        let err: pipelinehub_core::Error = Error::Status {
            status: 502,
            body: "bad gateway".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "API error: HTTP 502: bad gateway");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_io_maps_to_core_io() {
        let err = Error::io_with_path(std::io::Error::other("disk"), "/tmp/x.toml");
        assert!(err.to_string().contains("/tmp/x.toml"));
        let core: pipelinehub_core::Error = err.into();
        assert!(core.is_retryable());
    }

    #[test]
    fn test_parse_error_maps_to_config() {
        let source = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err = Error::ConfigParse {
            path: PathBuf::from("config.toml"),
            source,
        };
        let core: pipelinehub_core::Error = err.into();
        assert!(matches!(core, pipelinehub_core::Error::Config { .. }));
    }

    #[test]
    fn test_core_passes_through() {
        let core: pipelinehub_core::Error = Error::Core(pipelinehub_core::Error::api("x")).into();
        assert_eq!(core.to_string(), "API error: x");
    }
}
