//! Collection of the files that go into the archive.
//!
//! Runs after pruning, so every regular file still under the vendor tree is
//! packed. Symbolic links are never traversed: a link to a regular file is
//! packed with the target's content, while links to directories and
//! dangling links are skipped with a warning.

use crate::Result;
use std::fs;
use std::fs::Metadata;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;
use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

/// A file selected for packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Filesystem path the content is read from.
    pub path: PathBuf,

    /// `/`-separated path relative to the vendor root.
    pub archive_name: String,

    /// Size in bytes at collection time.
    pub size: u64,

    /// Modification time, seconds since the Unix epoch.
    pub mtime: u32,

    /// Unix permission bits.
    pub permissions: u32,
}

/// Files collected from a vendor tree, plus anything that was skipped.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// Files in stable file-name order.
    pub files: Vec<SourceFile>,

    /// Human-readable reasons for skipped entries.
    pub warnings: Vec<String>,
}

impl Collected {
    /// Sum of collected file sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Walks `vendor` and collects every regular file beneath it.
///
/// # Errors
///
/// Returns [`crate::PackError::Io`] if a directory or file cannot be read.
///
/// # Examples
///
/// ```no_run
/// use paerius_core::walker::collect_files;
///
/// let collected = collect_files("/srv/app/vendor".as_ref())?;
/// for file in &collected.files {
///     println!("{}", file.archive_name);
/// }
/// # Ok::<(), paerius_core::PackError>(())
/// ```
pub fn collect_files(vendor: &Path) -> Result<Collected> {
    let mut collected = Collected::default();

    let walker = WalkDir::new(vendor)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1);

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(vendor).unwrap_or(entry.path());
        let Some(archive_name) = archive_name(relative) else {
            skip(
                &mut collected,
                format!("skipped {}: name is not valid UTF-8", relative.display()),
            );
            continue;
        };

        let metadata = if file_type.is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(target) if target.is_file() => target,
                Ok(_) => {
                    skip(
                        &mut collected,
                        format!("skipped {archive_name}: link points to a directory"),
                    );
                    continue;
                }
                Err(_) => {
                    skip(
                        &mut collected,
                        format!("skipped {archive_name}: dangling link"),
                    );
                    continue;
                }
            }
        } else if file_type.is_file() {
            entry.metadata().map_err(std::io::Error::from)?
        } else {
            skip(
                &mut collected,
                format!("skipped {archive_name}: not a regular file"),
            );
            continue;
        };

        debug!(name = %archive_name, size = metadata.len(), "collected file");
        collected.files.push(SourceFile {
            path: entry.into_path(),
            archive_name,
            size: metadata.len(),
            mtime: mtime_of(&metadata),
            permissions: permissions_of(&metadata),
        });
    }

    Ok(collected)
}

fn skip(collected: &mut Collected, reason: String) {
    warn!("{reason}");
    collected.warnings.push(reason);
}

/// Joins the normal components of `relative` with `/`.
fn archive_name(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn mtime_of(metadata: &Metadata) -> u32 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
}

#[cfg(unix)]
fn permissions_of(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permissions_of(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
