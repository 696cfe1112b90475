//! Error types for the strider cache layer

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for cache and hashing operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Glob matching or content hashing failed.
    ///
    /// Fatal to the current task's caching attempt: without a valid key the
    /// task cannot be safely cached. Failed keys are never memoized, so a
    /// later call re-attempts the scan.
    #[error("Hash computation failed: {message}")]
    #[diagnostic(
        code(strider::hash::computation),
        help("Check that environment glob patterns are valid and matched files are readable")
    )]
    HashComputation {
        /// What went wrong during glob matching or hashing
        message: String,
    },

    /// I/O error during cache operations
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(strider::cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "create")
        operation: String,
    },

    /// Invalid or contradictory cache configuration, detected at construction
    #[error("Cache configuration error: {message}")]
    #[diagnostic(code(strider::cache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// The remote tier could not be reached.
    ///
    /// Always non-fatal at the provider boundary: fetches degrade to a miss
    /// and stores fall back to local-only, surfaced as a warning.
    #[error("Remote cache unavailable: {message}")]
    #[diagnostic(
        code(strider::cache::remote_unavailable),
        help("The remote cache is best-effort; task execution continues without it")
    )]
    RemoteUnavailable {
        /// Transport or storage failure detail
        message: String,
    },

    /// Cache key not found where an entry was required
    #[error("Cache key not found: {key}")]
    #[diagnostic(code(strider::cache::not_found))]
    NotFound {
        /// The cache key that was not found
        key: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(code(strider::cache::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },
}

impl Error {
    /// Create a hash computation error
    #[must_use]
    pub fn hash_computation(msg: impl Into<String>) -> Self {
        Self::HashComputation {
            message: msg.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a remote unavailability error
    #[must_use]
    pub fn remote_unavailable(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: msg.into(),
        }
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
