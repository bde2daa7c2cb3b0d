//! Archive listing.

use crate::Result;
use crate::inspection::manifest::ArchiveManifest;
use crate::phar::PharArchive;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads the manifest of the archive at `archive_path`.
///
/// # Errors
///
/// Returns [`crate::PackError::Io`] if the file cannot be read and
/// [`crate::PackError::InvalidArchive`] if it is not a well-formed archive.
///
/// # Examples
///
/// ```no_run
/// use paerius_core::list_archive;
///
/// let manifest = list_archive("/srv/app/vendor.phar")?;
/// for entry in &manifest.entries {
///     println!("{:>10} {}", entry.size, entry.name);
/// }
/// # Ok::<(), paerius_core::PackError>(())
/// ```
pub fn list_archive<P: AsRef<Path>>(archive_path: P) -> Result<ArchiveManifest> {
    let path = archive_path.as_ref();
    let archive = PharArchive::parse(fs::read(path)?)?;
    debug!(archive = %path.display(), entries = archive.entries().len(), "parsed archive");
    Ok(ArchiveManifest::from_archive(path.to_path_buf(), &archive))
}
