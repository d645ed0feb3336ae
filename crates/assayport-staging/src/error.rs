//! Error types for upload staging.

use thiserror::Error;

/// Which ceiling an upload ran into.
///
/// The user-facing remedy differs: a session violation means the caller
/// uploaded too much in this session; a root violation means the server
/// as a whole is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaScope {
    /// The identity-wide upload root, covering every session.
    Root,
    /// The caller's single session directory.
    Session,
}

impl std::fmt::Display for QuotaScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaScope::Root => write!(f, "server"),
            QuotaScope::Session => write!(f, "session"),
        }
    }
}

/// Errors that can occur during staging operations.
///
/// Garbage-collection failures are deliberately not represented here:
/// collection is best-effort and reports per-entry failures as data
/// rather than aborting.
#[derive(Debug, Error)]
pub enum StagingError {
    /// An incoming file would push a directory past its ceiling.
    ///
    /// The file must be discarded; nothing was written.
    #[error("{scope} upload ceiling of {ceiling_bytes} bytes reached")]
    QuotaExceeded {
        /// Which ceiling was hit
        scope: QuotaScope,
        /// The ceiling, in bytes
        ceiling_bytes: u64,
    },

    /// Filesystem failure creating, writing, or deleting staged data.
    ///
    /// Fatal to the single operation it occurred in.
    #[error("{context}: {source}")]
    Io {
        /// What the operation was doing when the failure occurred
        context: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl StagingError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StagingError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for staging operations.
pub type Result<T> = std::result::Result<T, StagingError>;
