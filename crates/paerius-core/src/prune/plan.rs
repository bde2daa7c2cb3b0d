//! Two-phase pruning: compute what to delete, then delete it.

use crate::Result;
use crate::prune::classify::Verdict;
use crate::prune::classify::classify;
use crate::prune::deny::DenyLists;
use crate::report::PruneReport;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use walkdir::WalkDir;

/// How a planned path is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalKind {
    /// A single file or link.
    Entry,
    /// A directory and all of its contents.
    Tree,
}

/// A path scheduled for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRemoval {
    /// Full filesystem path.
    pub path: PathBuf,
    /// Path relative to the vendor root.
    pub relative: PathBuf,
    /// Whether a single entry or a whole tree is removed.
    pub kind: RemovalKind,
}

impl PlannedRemoval {
    fn depth(&self) -> usize {
        self.relative.components().count()
    }
}

/// The set of vendor paths a prune will delete.
///
/// Produced by [`plan_prune`] without touching the filesystem. Planned paths
/// never overlap: once a directory is scheduled as a tree, nothing beneath it
/// is listed separately.
#[derive(Debug, Clone, Default)]
pub struct PrunePlan {
    removals: Vec<PlannedRemoval>,
}

impl PrunePlan {
    /// Planned removals in traversal order.
    #[must_use]
    pub fn removals(&self) -> &[PlannedRemoval] {
        &self.removals
    }

    /// Number of planned removals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.removals.len()
    }

    /// Returns `true` if nothing would be deleted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }

    /// Deletes every planned path, deepest first.
    ///
    /// Trees are enumerated and emptied before the directory itself is
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PackError::Io`] on the first failed deletion,
    /// including a planned file that no longer exists.
    pub fn apply(mut self) -> Result<PruneReport> {
        let start = Instant::now();
        let mut report = PruneReport::default();

        self.removals
            .sort_by(|a, b| b.depth().cmp(&a.depth()).then_with(|| a.path.cmp(&b.path)));

        for removal in &self.removals {
            match removal.kind {
                RemovalKind::Entry => {
                    let size = fs::symlink_metadata(&removal.path)?.len();
                    fs::remove_file(&removal.path)?;
                    report.files_removed += 1;
                    report.bytes_removed += size;
                    debug!(path = %removal.relative.display(), "removed file");
                }
                RemovalKind::Tree => {
                    remove_tree(&removal.path, &mut report)?;
                    debug!(path = %removal.relative.display(), "removed directory tree");
                }
            }
        }

        report.duration = start.elapsed();
        Ok(report)
    }
}

/// Walks `vendor` and records every entry the deny-lists reject.
///
/// Symbolic links are never followed; a link is judged by its own name.
///
/// # Errors
///
/// Returns [`crate::PackError::Io`] if a directory cannot be read.
///
/// # Examples
///
/// ```no_run
/// use paerius_core::prune::DenyLists;
/// use paerius_core::prune::plan_prune;
///
/// let plan = plan_prune("/srv/app/vendor".as_ref(), &DenyLists::default())?;
/// for removal in plan.removals() {
///     println!("would remove {}", removal.relative.display());
/// }
/// # Ok::<(), paerius_core::PackError>(())
/// ```
pub fn plan_prune(vendor: &Path, deny: &DenyLists) -> Result<PrunePlan> {
    let mut plan = PrunePlan::default();
    let mut walker = WalkDir::new(vendor)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1)
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(vendor)
            .unwrap_or_else(|_| entry.path())
            .to_path_buf();
        let is_dir = entry.file_type().is_dir();

        let kind = match classify(&relative, is_dir, deny) {
            Verdict::Keep => continue,
            // Unreachable while trees are skipped, but harmless: the
            // ancestor removal already covers it.
            Verdict::InsideDeniedDirectory => continue,
            Verdict::RemoveEntry => RemovalKind::Entry,
            Verdict::RemoveTree => {
                walker.skip_current_dir();
                RemovalKind::Tree
            }
        };

        plan.removals.push(PlannedRemoval {
            path: entry.into_path(),
            relative,
            kind,
        });
    }

    Ok(plan)
}

fn remove_tree(root: &Path, report: &mut PruneReport) -> Result<()> {
    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())?;
            report.directories_removed += 1;
        } else {
            let size = entry.metadata().map_err(std::io::Error::from)?.len();
            fs::remove_file(entry.path())?;
            report.files_removed += 1;
            report.bytes_removed += size;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::VendorTree;

    fn relative_paths(plan: &PrunePlan) -> Vec<String> {
        plan.removals()
            .iter()
            .map(|r| r.relative.to_str().unwrap().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_plan_does_not_touch_disk() {
        let tree = VendorTree::new()
            .file("pkg/LICENSE", "MIT")
            .file("pkg/src/main.php", "<?php");

        let plan = plan_prune(tree.vendor(), &DenyLists::default()).unwrap();
        assert_eq!(relative_paths(&plan), vec!["pkg/LICENSE"]);
        assert!(tree.vendor().join("pkg/LICENSE").exists());
    }

    #[test]
    fn test_plan_collapses_denied_directories() {
        let tree = VendorTree::new()
            .file("pkg/tests/a.php", "a")
            .file("pkg/tests/deep/b.php", "b")
            .file("pkg/tests/README.md", "readme")
            .file("pkg/src/c.php", "c");

        let plan = plan_prune(tree.vendor(), &DenyLists::default()).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.removals()[0].kind, RemovalKind::Tree);
        assert_eq!(relative_paths(&plan), vec!["pkg/tests"]);
    }

    #[test]
    fn test_apply_removes_files_and_trees() {
        let tree = VendorTree::new()
            .file("pkg/LICENSE", "MIT")
            .file("pkg/.git/HEAD", "ref: refs/heads/main")
            .file("pkg/.git/objects/ab/cdef", "blob")
            .file("pkg/src/main.php", "<?php");

        let report = plan_prune(tree.vendor(), &DenyLists::default())
            .unwrap()
            .apply()
            .unwrap();

        assert_eq!(report.files_removed, 3);
        assert_eq!(report.directories_removed, 3);
        assert!(!tree.vendor().join("pkg/.git").exists());
        assert!(!tree.vendor().join("pkg/LICENSE").exists());
        assert!(tree.vendor().join("pkg/src/main.php").exists());
    }

    #[test]
    fn test_apply_fails_on_vanished_file() {
        let tree = VendorTree::new().file("pkg/LICENSE", "MIT");

        let plan = plan_prune(tree.vendor(), &DenyLists::default()).unwrap();
        fs::remove_file(tree.vendor().join("pkg/LICENSE")).unwrap();

        let result = plan.apply();
        assert!(matches!(result, Err(crate::PackError::Io(_))));
    }

    #[test]
    fn test_empty_vendor_is_noop() {
        let tree = VendorTree::new();
        let plan = plan_prune(tree.vendor(), &DenyLists::default()).unwrap();
        assert!(plan.is_empty());

        let report = plan.apply().unwrap();
        assert_eq!(report.total_removed(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let tree = VendorTree::new().file("pkg/src/main.php", "<?php");
        let link = tree.vendor().join("pkg/loop");
        std::os::unix::fs::symlink(tree.vendor(), &link).unwrap();

        // A self-referential link is a leaf and does not recurse.
        let plan = plan_prune(tree.vendor(), &DenyLists::default()).unwrap();
        assert!(plan.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_denied_symlink_removes_link_only() {
        let tree = VendorTree::new().file("keep/tests.php", "<?php");
        let target = tree.vendor().join("keep");
        let link = tree.vendor().join("pkg/tests");
        fs::create_dir_all(tree.vendor().join("pkg")).unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        // Links are not directories, so "tests" is judged as a file name and kept.
        let plan = plan_prune(tree.vendor(), &DenyLists::default()).unwrap();
        assert!(plan.is_empty());

        let link_md = tree.vendor().join("pkg/NOTES.md");
        std::os::unix::fs::symlink(target.join("tests.php"), &link_md).unwrap();
        plan_prune(tree.vendor(), &DenyLists::default())
            .unwrap()
            .apply()
            .unwrap();

        assert!(fs::symlink_metadata(&link_md).is_err());
        assert!(target.join("tests.php").exists());
    }
}
