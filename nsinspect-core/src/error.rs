//! Error types for nsinspect

use std::path::PathBuf;

use thiserror::Error;

/// nsinspect error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// System error from nix
    #[error("System error: {0}")]
    System(#[from] nix::Error),

    /// Network namespace path does not exist
    #[error("Network namespace not found: {}", path.display())]
    NamespaceNotFound {
        /// Namespace path that was looked up
        path: PathBuf,
    },

    /// Permission denied
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// Namespace operation failed
    #[error("Namespace error: {message}")]
    Namespace {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// CNI result cache file could not be read
    #[error("Failed to read CNI result {}: {source}", path.display())]
    CacheRead {
        /// Cache file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// CNI result cache file is not valid JSON for the expected shape
    #[error("Malformed CNI result {}: {source}", path.display())]
    CacheParse {
        /// Cache file path
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// CNI result lacks data needed to build a snapshot
    #[error("Incomplete CNI result {}: {message}", path.display())]
    IncompleteResult {
        /// Cache file path
        path: PathBuf,
        /// What is missing
        message: String,
    },
}

impl Error {
    /// Map an I/O failure on a namespace path to the matching variant
    #[must_use]
    pub fn from_namespace_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NamespaceNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                operation: format!("open {}", path.display()),
            },
            _ => Self::Namespace {
                message: format!("Failed to open {}: {err}", path.display()),
            },
        }
    }

    /// Check if the error means the namespace could not be reached at all
    ///
    /// Callers use this to decide whether to fall back to the CNI cache.
    #[must_use]
    pub const fn is_namespace_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NamespaceNotFound { .. } | Self::PermissionDenied { .. } | Self::Namespace { .. }
        )
    }
}

/// Result type alias for nsinspect operations
pub type Result<T> = std::result::Result<T, Error>;
