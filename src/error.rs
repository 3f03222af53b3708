//! Error types for drive operations.
//!
//! Backends report failures as `anyhow` errors with context; the store
//! client translates them into this small taxonomy so that hosts can map
//! each kind onto their own responses.

/// Boxed error carried as the source of store failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for drive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Drive errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Key or prefix absent from the store.
    #[error("not found: {key}")]
    NotFound { key: String },

    /// Transport, permission or unexpected backend failure. Never retried here.
    #[error("store error during {op} on '{key}': {source}")]
    Store {
        op: &'static str,
        key: String,
        #[source]
        source: BoxError,
    },

    /// Stored or supplied content could not be encoded or decoded.
    #[error("codec error: {reason}")]
    Codec { reason: String },

    /// The copy half of a rename succeeded but the delete did not; both keys exist.
    #[error("rename of '{old}' to '{new}' copied the object but could not delete the source: {source}")]
    PartialRename {
        old: String,
        new: String,
        #[source]
        source: BoxError,
    },

    /// A content type or format name with no mapping.
    #[error("unknown content type: '{0}'")]
    UnknownContentType(String),

    /// A path the requested operation cannot act on.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Checkpoint ids must be non-empty and free of '-', '.' and '/'.
    #[error("invalid checkpoint id: '{0}'")]
    InvalidCheckpointId(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Wrap a backend failure.
    pub fn store(op: &'static str, key: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Store {
            op,
            key: key.into(),
            source: source.into(),
        }
    }

    /// Create a codec error.
    pub fn codec(reason: impl Into<String>) -> Self {
        Self::Codec {
            reason: reason.into(),
        }
    }

    /// Create a partial rename error.
    pub fn partial_rename(
        old: impl Into<String>,
        new: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self::PartialRename {
            old: old.into(),
            new: new.into(),
            source: source.into(),
        }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get the HTTP status code a host would answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::UnknownContentType(_)
            | Self::InvalidCheckpointId(_)
            | Self::InvalidPath { .. }
            | Self::Codec { .. } => 400,
            Self::Store { .. } | Self::PartialRename { .. } | Self::Config(_) => 500,
        }
    }
}
