//! Build orchestration: prune the vendor tree, then pack it.

use crate::PackError;
use crate::Result;
use crate::compression::Compression;
use crate::config::PackConfig;
use crate::paths::ProjectPaths;
use crate::phar::PharWriter;
use crate::phar::format::DATETIME_KEY;
use crate::prune;
use crate::prune::PrunePlan;
use crate::report::BuildReport;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::report::PruneReport;
use crate::walker::collect_files;
use chrono::SecondsFormat;
use chrono::Utc;
use std::fs;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::debug;
use tracing::info;

/// Prunes a project's `vendor` directory and packs it into a Phar archive.
///
/// Both the working directory and its `vendor` subdirectory are checked
/// when the packer is created.
///
/// # Examples
///
/// ```no_run
/// use paerius_core::VendorPacker;
///
/// let mut packer = VendorPacker::new("/srv/app")?;
/// packer.set_base_name("app.phar")?;
///
/// let report = packer.build(None)?;
/// println!(
///     "packed {} files into {} ({})",
///     report.files_added,
///     report.archive_path.display(),
///     report.compression
/// );
/// # Ok::<(), paerius_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct VendorPacker {
    paths: ProjectPaths,
    config: PackConfig,
}

impl VendorPacker {
    /// Creates a packer for `working` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Configuration`] if `working` or `working/vendor`
    /// is not an existing directory.
    pub fn new<P: AsRef<Path>>(working: P) -> Result<Self> {
        Self::with_config(working, PackConfig::default())
    }

    /// Creates a packer for `working` with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Configuration`] if a directory is missing or the
    /// base name is not a plain file name, and
    /// [`PackError::InvalidCompressionLevel`] for a level outside 1-9.
    pub fn with_config<P: AsRef<Path>>(working: P, config: PackConfig) -> Result<Self> {
        config.validate()?;
        let paths = ProjectPaths::new(working)?;
        debug!(
            working = %paths.working().display(),
            base_name = %config.base_name,
            "packer configured"
        );
        Ok(Self { paths, config })
    }

    /// Overrides the archive file name.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Configuration`] if `name` is not a plain file
    /// name; the previous name is kept.
    pub fn set_base_name(&mut self, name: impl Into<String>) -> Result<()> {
        let config = self.config.clone().with_base_name(name);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// The archive file name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.config.base_name
    }

    /// The working directory.
    #[must_use]
    pub fn working_path(&self) -> &Path {
        self.paths.working()
    }

    /// The vendor directory.
    #[must_use]
    pub fn vendor_path(&self) -> &Path {
        self.paths.vendor()
    }

    /// Where [`VendorPacker::build`] writes the archive.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.paths.working().join(&self.config.base_name)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Computes what [`VendorPacker::prune`] would delete, without deleting.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`] if the vendor tree cannot be read.
    pub fn plan_prune(&self) -> Result<PrunePlan> {
        prune::plan_prune(self.paths.vendor(), &self.config.deny)
    }

    /// Deletes non-runtime files from the vendor tree.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`] if the tree cannot be read or a deletion
    /// fails.
    pub fn prune(&self) -> Result<PruneReport> {
        prune::prune(self.paths.vendor(), &self.config.deny)
    }

    /// Prunes the vendor tree and writes a fresh archive.
    ///
    /// `force_compression` selects a codec by prefix (`bz`, `gz`, anything
    /// else for none); `None` picks the best codec compiled in.
    ///
    /// # Errors
    ///
    /// - [`PackError::UnsupportedOperation`] if the forced codec is not
    ///   compiled in; nothing is touched in that case
    /// - [`PackError::InvalidState`] if no files are left to pack, the vendor
    ///   directory has disappeared, or a file exceeds the format's limits
    /// - [`PackError::Io`] on any filesystem failure
    pub fn build(&self, force_compression: Option<&str>) -> Result<BuildReport> {
        self.build_with_progress(force_compression, &mut NoopProgress)
    }

    /// Like [`VendorPacker::build`], reporting each packed file to
    /// `progress`.
    ///
    /// # Errors
    ///
    /// See [`VendorPacker::build`].
    pub fn build_with_progress(
        &self,
        force_compression: Option<&str>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<BuildReport> {
        let start = Instant::now();
        let compression = Compression::resolve(force_compression)?;
        let archive_path = self.archive_path();
        let vendor = self.paths.vendor();

        info!(
            archive = %archive_path.display(),
            %compression,
            "building archive"
        );

        remove_stale_archive(&archive_path)?;

        if !vendor.is_dir() {
            return Err(PackError::invalid_state(format!(
                "vendor directory {} no longer exists",
                vendor.display()
            )));
        }

        let mut report =
            BuildReport::new(archive_path.clone(), self.config.base_name.clone(), compression);
        report.prune = prune::prune(vendor, &self.config.deny)?;

        let collected = collect_files(vendor)?;
        if collected.files.is_empty() {
            return Err(PackError::invalid_state(format!(
                "no files left to package in {}",
                vendor.display()
            )));
        }
        for warning in collected.warnings {
            report.add_warning(warning);
        }

        report.created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        let mut writer = PharWriter::new(self.config.base_name.as_str(), compression)
            .with_level(self.config.compression_level)
            .with_metadata(DATETIME_KEY, report.created_at.as_str());

        let total = collected.files.len();
        for (index, file) in collected.files.iter().enumerate() {
            let name = Path::new(&file.archive_name);
            progress.on_entry_start(name, total, index + 1);

            if file.size > u64::from(u32::MAX) {
                return Err(PackError::invalid_state(format!(
                    "{} is {} bytes, beyond the archive format's 4 GiB limit",
                    file.archive_name, file.size
                )));
            }

            let data = fs::read(&file.path)?;
            progress.on_bytes_written(data.len() as u64);

            let sizes = writer.add_file(&file.archive_name, &data, file.mtime, file.permissions)?;
            report.files_added += 1;
            report.bytes_written += sizes.size;
            report.bytes_compressed += sizes.compressed_size;

            progress.on_entry_complete(name);
        }

        let written = write_atomically(&writer, self.paths.working(), &archive_path)?;
        report.archive_size = written.archive_size;
        report.signature = hex::encode(written.signature);
        report.duration = start.elapsed();

        progress.on_complete();
        info!(
            archive = %archive_path.display(),
            files = report.files_added,
            size = report.archive_size,
            "archive written"
        );

        Ok(report)
    }
}

fn remove_stale_archive(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(archive = %path.display(), "removed previous archive");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Writes into a temporary file next to `target`, then renames it over
/// `target`. The temporary file is deleted on every error path.
fn write_atomically(
    writer: &PharWriter,
    dir: &Path,
    target: &Path,
) -> Result<crate::phar::WrittenArchive> {
    let mut temp = NamedTempFile::new_in(dir)?;
    let written = writer.write_to(BufWriter::new(temp.as_file_mut()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    temp.persist(target).map_err(|e| PackError::Io(e.error))?;
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::VendorTree;

    #[test]
    fn test_new_requires_vendor() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = VendorPacker::new(temp.path()).unwrap_err();
        assert!(matches!(err, PackError::Configuration { .. }));
    }

    #[test]
    fn test_paths_and_default_name() {
        let tree = VendorTree::new();
        let packer = VendorPacker::new(tree.working()).unwrap();

        assert_eq!(packer.base_name(), "vendor.phar");
        assert_eq!(packer.working_path(), tree.working());
        assert_eq!(packer.vendor_path(), tree.vendor());
        assert_eq!(packer.archive_path(), tree.working().join("vendor.phar"));
    }

    #[test]
    fn test_set_base_name_keeps_old_on_error() {
        let tree = VendorTree::new();
        let mut packer = VendorPacker::new(tree.working()).unwrap();

        packer.set_base_name("app.phar").unwrap();
        assert_eq!(packer.base_name(), "app.phar");

        assert!(packer.set_base_name("../escape.phar").is_err());
        assert_eq!(packer.base_name(), "app.phar");
    }

    #[test]
    fn test_build_empty_vendor_is_invalid_state() {
        let tree = VendorTree::new().file("pkg/LICENSE", "MIT");
        let packer = VendorPacker::new(tree.working()).unwrap();

        let err = packer.build(Some("none")).unwrap_err();
        assert!(matches!(err, PackError::InvalidState { .. }));
        assert!(!packer.archive_path().exists());
    }

    #[test]
    fn test_build_without_vendor_is_invalid_state() {
        let tree = VendorTree::new().file("a.php", "<?php");
        let packer = VendorPacker::new(tree.working()).unwrap();
        fs::remove_dir_all(tree.vendor()).unwrap();

        let err = packer.build(Some("none")).unwrap_err();
        assert!(matches!(err, PackError::InvalidState { .. }));
    }

    #[test]
    fn test_build_reports_counts() {
        let tree = VendorTree::new()
            .file("autoload.php", "<?php require __DIR__.'/acme/src/A.php';")
            .file("acme/src/A.php", "<?php class A {}")
            .file("acme/README.md", "# acme");
        let packer = VendorPacker::new(tree.working()).unwrap();

        let report = packer.build(Some("none")).unwrap();
        assert_eq!(report.files_added, 2);
        assert_eq!(report.prune.files_removed, 1);
        assert_eq!(report.compression, Compression::None);
        assert_eq!(report.bytes_written, report.bytes_compressed);
        assert_eq!(report.signature.len(), 64);
        assert!(report.created_at.ends_with("+00:00"));
        assert_eq!(
            fs::metadata(&report.archive_path).unwrap().len(),
            report.archive_size
        );
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let tree = VendorTree::new().file("a.php", "<?php");
        let packer = VendorPacker::new(tree.working()).unwrap();
        packer.build(Some("none")).unwrap();

        let mut names: Vec<_> = fs::read_dir(tree.working())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["vendor", "vendor.phar"]);
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<(String, usize, usize)>,
        bytes: u64,
        completed: usize,
        finished: bool,
    }

    impl ProgressCallback for Recorder {
        fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
            self.started
                .push((path.to_string_lossy().into_owned(), total, current));
        }

        fn on_bytes_written(&mut self, bytes: u64) {
            self.bytes += bytes;
        }

        fn on_entry_complete(&mut self, _path: &Path) {
            self.completed += 1;
        }

        fn on_complete(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn test_build_reports_progress() {
        let tree = VendorTree::new().file("a.php", "aa").file("b.php", "bbb");
        let packer = VendorPacker::new(tree.working()).unwrap();
        let mut recorder = Recorder::default();

        packer
            .build_with_progress(Some("none"), &mut recorder)
            .unwrap();

        assert_eq!(
            recorder.started,
            vec![("a.php".to_string(), 2, 1), ("b.php".to_string(), 2, 2)]
        );
        assert_eq!(recorder.bytes, 5);
        assert_eq!(recorder.completed, 2);
        assert!(recorder.finished);
    }
}
