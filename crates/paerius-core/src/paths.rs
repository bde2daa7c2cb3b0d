//! Working and vendor directory validation.

use crate::PackError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// Name of the dependency directory inside the working directory.
pub const VENDOR_DIR_NAME: &str = "vendor";

/// Normalizes separators and confirms `path` is an existing directory.
///
/// Trailing and repeated separators are dropped; a bare root is kept as is.
///
/// # Errors
///
/// Returns [`PackError::Configuration`] naming `path` if it does not exist
/// or is not a directory.
///
/// # Examples
///
/// ```no_run
/// use paerius_core::paths::validate_dir;
///
/// let dir = validate_dir("/srv/app/")?;
/// assert_eq!(dir.to_str(), Some("/srv/app"));
/// # Ok::<(), paerius_core::PackError>(())
/// ```
pub fn validate_dir<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let normalized = normalize(path.as_ref());

    match std::fs::metadata(&normalized) {
        Ok(meta) if meta.is_dir() => Ok(normalized),
        Ok(_) => Err(PackError::configuration(normalized, "is not a directory")),
        Err(e) => Err(PackError::configuration(
            normalized,
            format!("is not a directory: {e}"),
        )),
    }
}

/// Validated working and vendor directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    working: PathBuf,
    vendor: PathBuf,
}

impl ProjectPaths {
    /// Validates `working` and its `vendor` subdirectory.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Configuration`] if either directory is missing.
    pub fn new<P: AsRef<Path>>(working: P) -> Result<Self> {
        let working = validate_dir(working)?;
        let vendor = validate_dir(working.join(VENDOR_DIR_NAME))?;
        Ok(Self { working, vendor })
    }

    /// The working directory, without trailing separators.
    #[must_use]
    pub fn working(&self) -> &Path {
        &self.working
    }

    /// The `vendor` directory inside the working directory.
    #[must_use]
    pub fn vendor(&self) -> &Path {
        &self.vendor
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
