//! Operation reports and progress callbacks.

use crate::compression::Compression;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Report of a prune operation.
///
/// # Examples
///
/// ```
/// use paerius_core::PruneReport;
///
/// let mut report = PruneReport::default();
/// report.files_removed = 4;
/// report.directories_removed = 1;
/// assert_eq!(report.total_removed(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Number of files and links deleted.
    pub files_removed: usize,

    /// Number of directories deleted.
    pub directories_removed: usize,

    /// Total size of deleted files in bytes.
    pub bytes_removed: u64,

    /// Duration of the prune.
    pub duration: Duration,
}

impl PruneReport {
    /// Returns the number of deleted filesystem entries.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.files_removed + self.directories_removed
    }
}

/// Report of a completed archive build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Location of the written archive.
    pub archive_path: PathBuf,

    /// Alias the archive maps itself under.
    pub alias: String,

    /// Compression applied to every stored file.
    pub compression: Compression,

    /// Number of files stored in the archive.
    pub files_added: usize,

    /// Total uncompressed size of stored files.
    pub bytes_written: u64,

    /// Total size of stored file data after compression.
    pub bytes_compressed: u64,

    /// Size of the archive file, including stub, manifest and signature.
    pub archive_size: u64,

    /// Hex-encoded SHA-256 signature of the archive.
    pub signature: String,

    /// ISO-8601 timestamp stored in the archive metadata.
    pub created_at: String,

    /// What the prune phase removed.
    pub prune: PruneReport,

    /// Duration of the whole build.
    pub duration: Duration,

    /// Entries that were skipped while packing.
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Creates an empty report for an archive at `archive_path`.
    #[must_use]
    pub fn new(archive_path: PathBuf, alias: String, compression: Compression) -> Self {
        Self {
            archive_path,
            alias,
            compression,
            files_added: 0,
            bytes_written: 0,
            bytes_compressed: 0,
            archive_size: 0,
            signature: String::new(),
            created_at: String::new(),
            prune: PruneReport::default(),
            duration: Duration::default(),
            warnings: Vec::new(),
        }
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the compression percentage (space saved) of stored file data.
    ///
    /// Returns 0.0 if nothing was written.
    ///
    /// # Examples
    ///
    /// ```
    /// use paerius_core::BuildReport;
    /// use paerius_core::Compression;
    /// use std::path::PathBuf;
    ///
    /// let mut report = BuildReport::new(
    ///     PathBuf::from("vendor.phar"),
    ///     "vendor.phar".to_string(),
    ///     Compression::Gzip,
    /// );
    /// report.bytes_written = 1000;
    /// report.bytes_compressed = 250;
    /// assert_eq!(report.compression_percentage(), 75.0);
    /// ```
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }
}

/// Callback trait for build progress.
///
/// Implementors receive one `on_entry_start`/`on_entry_complete` pair per
/// packed file, byte counts as file data is read, and a final `on_complete`.
pub trait ProgressCallback {
    /// Called when starting to pack a file.
    ///
    /// # Arguments
    ///
    /// * `path` - Archive path of the file
    /// * `total` - Total number of files to pack
    /// * `current` - Current file number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called after a file's content has been read.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when a file has been stored.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called when the archive is complete.
    fn on_complete(&mut self);
}

/// No-op progress callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
