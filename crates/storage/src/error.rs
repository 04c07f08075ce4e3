use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

/// Source error carried by connection and transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by storage backends and their initializers.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Rejected before any I/O happened.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Could not establish or authenticate the remote session.
    #[error("could not connect to <{address}>: {source}")]
    Connection { address: String, source: BoxError },

    /// No object stored under the requested key.
    #[error("key <{key}> not found")]
    NotFound { key: String },

    /// An established backend failed mid-operation.
    #[error("{operation} failed for <{key}>: {source}")]
    Transport {
        operation: &'static str,
        key: String,
        source: BoxError,
    },
}

impl BackendError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn connection(address: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            address: address.into(),
            source: source.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn transport(
        operation: &'static str,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Transport {
            operation,
            key: key.into(),
            source: source.into(),
        }
    }

    /// True for the cache-miss case rather than a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
