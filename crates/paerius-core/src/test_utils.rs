//! Test utilities for building throwaway project trees.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::paths::VENDOR_DIR_NAME;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary working directory with a `vendor` subdirectory.
///
/// The tree is deleted when the value is dropped.
///
/// # Examples
///
/// ```
/// use paerius_core::test_utils::VendorTree;
///
/// let tree = VendorTree::new()
///     .file("acme/log/src/Logger.php", "<?php")
///     .file("acme/log/README.md", "# log");
///
/// assert_eq!(tree.relative_files().len(), 2);
/// assert!(tree.vendor().ends_with("vendor"));
/// ```
#[derive(Debug)]
pub struct VendorTree {
    temp: TempDir,
    vendor: PathBuf,
}

impl VendorTree {
    /// Creates an empty working directory containing `vendor/`.
    #[must_use]
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let vendor = temp.path().join(VENDOR_DIR_NAME);
        fs::create_dir(&vendor).unwrap();
        Self { temp, vendor }
    }

    /// Writes a file at `relative` (`/`-separated) inside the vendor tree,
    /// creating parent directories as needed.
    #[must_use]
    pub fn file(self, relative: &str, content: impl AsRef<[u8]>) -> Self {
        let path = self.vendor().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    /// Creates an empty directory at `relative` inside the vendor tree.
    #[must_use]
    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.vendor().join(relative)).unwrap();
        self
    }

    /// The working directory.
    #[must_use]
    pub fn working(&self) -> &Path {
        self.temp.path()
    }

    /// The vendor directory.
    #[must_use]
    pub fn vendor(&self) -> &Path {
        &self.vendor
    }

    /// Every non-directory entry under the vendor tree, `/`-separated and
    /// sorted.
    #[must_use]
    pub fn relative_files(&self) -> Vec<String> {
        let vendor = self.vendor();
        let mut files: Vec<String> = WalkDir::new(vendor)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| !e.file_type().is_dir())
            .map(|e| {
                e.path()
                    .strip_prefix(vendor)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

impl Default for VendorTree {
    fn default() -> Self {
        Self::new()
    }
}
