//! Error types for pruning and packaging operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while pruning a vendor tree or building an archive.
#[derive(Error, Debug)]
pub enum PackError {
    /// The working directory, vendor directory or archive name is unusable.
    #[error("invalid configuration for {path}: {reason}")]
    Configuration {
        /// The offending path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested operation is not available in this build.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Description of the unavailable operation.
        operation: String,
    },

    /// The source tree cannot be packaged in its current state.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Why the build cannot proceed.
        reason: String,
    },

    /// An existing archive could not be parsed.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),
}

impl PackError {
    /// Creates a configuration error for `path`.
    pub(crate) fn configuration(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid-state error.
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error was raised before any file was touched.
    ///
    /// Configuration and unsupported-operation errors are detected up front,
    /// so the vendor tree and any previous archive are left as they were.
    ///
    /// # Examples
    ///
    /// ```
    /// use paerius_core::PackError;
    ///
    /// let err = PackError::UnsupportedOperation {
    ///     operation: "bzip2 compression".to_string(),
    /// };
    /// assert!(err.is_preflight());
    ///
    /// let err = PackError::InvalidArchive("truncated manifest".to_string());
    /// assert!(!err.is_preflight());
    /// ```
    #[must_use]
    pub const fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::InvalidCompressionLevel { .. }
                | Self::UnsupportedOperation { .. }
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use paerius_core::PackError;
    ///
    /// let err = PackError::InvalidArchive("bad magic".to_string());
    /// assert_eq!(err.context(), Some("bad magic"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Configuration { reason, .. } | Self::InvalidState { reason } => Some(reason),
            Self::UnsupportedOperation { operation } => Some(operation),
            Self::InvalidArchive(msg) => Some(msg),
            Self::Io(_) | Self::InvalidCompressionLevel { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_path() {
        let err = PackError::configuration("/app/vendor", "not a directory");
        let display = err.to_string();
        assert!(display.contains("/app/vendor"));
        assert!(display.contains("not a directory"));
        assert!(err.is_preflight());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PackError = io_err.into();
        assert!(matches!(err, PackError::Io(_)));
        assert!(!err.is_preflight());
        assert_eq!(err.context(), None);
    }

    #[test]
    fn test_invalid_state_error() {
        let err = PackError::invalid_state("no files left to package");
        assert_eq!(
            err.to_string(),
            "invalid state: no files left to package"
        );
        assert_eq!(err.context(), Some("no files left to package"));
    }

    #[test]
    fn test_invalid_compression_level_error() {
        let err = PackError::InvalidCompressionLevel { level: 12 };
        assert_eq!(
            err.to_string(),
            "invalid compression level 12, must be 1-9"
        );
        assert!(err.is_preflight());
    }

    #[test]
    fn test_unsupported_operation_error() {
        let err = PackError::UnsupportedOperation {
            operation: "gzip compression".into(),
        };
        assert!(err.to_string().contains("gzip compression"));
    }
}
