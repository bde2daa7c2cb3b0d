//! Error conversion utilities for CLI.
//!
//! Converts paerius-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use paerius_core::PackError;
use std::path::Path;

/// Converts `PackError` to a user-friendly anyhow error mentioning `target`.
pub fn convert_pack_error(err: PackError, target: &Path) -> anyhow::Error {
    match err {
        PackError::Configuration { path, reason } => {
            anyhow!(
                "Invalid setup: '{}' {}\n\
                 HINT: Run from a project directory that contains a vendor/ directory, \
                 or pass it as WORKDIR.",
                path.display(),
                reason
            )
        }
        PackError::InvalidCompressionLevel { level } => {
            anyhow!(
                "Invalid compression level {level}\n\
                 HINT: Use a level between 1 (fastest) and 9 (smallest)."
            )
        }
        PackError::UnsupportedOperation { operation } => {
            anyhow!(
                "Cannot build '{}': {}\n\
                 HINT: Pass --compression none, or rebuild paerius with the codec's cargo feature.",
                target.display(),
                operation
            )
        }
        PackError::InvalidState { reason } => {
            anyhow!(
                "Cannot build '{}': {}\n\
                 HINT: Check that the vendor directory still holds runtime files after pruning.",
                target.display(),
                reason
            )
        }
        PackError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The file is not a Phar archive, or it is truncated.",
                target.display(),
                reason
            )
        }
        PackError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {}", target.display(), io_err)
        }
    }
}

/// Adds context to a core result about `target`.
pub fn add_context<T>(result: Result<T, PackError>, target: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_pack_error(e, target))
}
