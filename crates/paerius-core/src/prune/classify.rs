//! Pure classification of vendor entries against deny-lists.

use crate::prune::deny::DenyLists;
use std::path::Component;
use std::path::Path;

/// Outcome of classifying a single vendor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Entry is needed at runtime.
    Keep,

    /// Remove this file or link.
    RemoveEntry,

    /// Remove this directory together with everything beneath it.
    RemoveTree,

    /// A directory between the vendor root and this entry is denied, so the
    /// entry goes away with it regardless of its own name.
    InsideDeniedDirectory,
}

impl Verdict {
    /// Returns `true` if the entry will not survive pruning.
    #[must_use]
    pub const fn is_removed(self) -> bool {
        !matches!(self, Self::Keep)
    }
}

/// Classifies an entry given its path relative to the vendor root.
///
/// Rules, in order:
/// 1. any ancestor directory segment is denied: [`Verdict::InsideDeniedDirectory`]
/// 2. a real directory whose own name is denied: [`Verdict::RemoveTree`]
/// 3. a non-directory whose lowercase extension or exact basename is denied:
///    [`Verdict::RemoveEntry`]
///
/// Everything else is kept. Names that are not valid UTF-8 never match.
///
/// # Examples
///
/// ```
/// use paerius_core::prune::DenyLists;
/// use paerius_core::prune::Verdict;
/// use paerius_core::prune::classify;
/// use std::path::Path;
///
/// let deny = DenyLists::default();
/// assert_eq!(classify(Path::new("pkg/LICENSE"), false, &deny), Verdict::RemoveEntry);
/// assert_eq!(classify(Path::new("pkg/tests"), true, &deny), Verdict::RemoveTree);
/// assert_eq!(
///     classify(Path::new("pkg/tests/src/main.php"), false, &deny),
///     Verdict::InsideDeniedDirectory
/// );
/// assert_eq!(classify(Path::new("pkg/src/main.php"), false, &deny), Verdict::Keep);
/// ```
#[must_use]
pub fn classify(relative: &Path, is_dir: bool, deny: &DenyLists) -> Verdict {
    let mut names = relative.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_str()),
        _ => None,
    });

    let Some(own_name) = names.next_back() else {
        // The vendor root itself.
        return Verdict::Keep;
    };

    if names.any(|segment| segment.is_some_and(|s| deny.denies_directory(s))) {
        return Verdict::InsideDeniedDirectory;
    }

    let Some(own_name) = own_name else {
        return Verdict::Keep;
    };

    if is_dir {
        return if deny.denies_directory(own_name) {
            Verdict::RemoveTree
        } else {
            Verdict::Keep
        };
    }

    let extension_denied = extension_of(own_name).is_some_and(|ext| deny.denies_extension(ext));
    if extension_denied || deny.denies_basename(own_name) {
        Verdict::RemoveEntry
    } else {
        Verdict::Keep
    }
}

/// Returns the text after the last `.` of a file name.
///
/// Unlike [`Path::extension`], a leading dot counts, so `.gitignore` has
/// the extension `gitignore`.
///
/// # Examples
///
/// ```
/// use paerius_core::prune::classify::extension_of;
///
/// assert_eq!(extension_of("README.md"), Some("md"));
/// assert_eq!(extension_of(".gitignore"), Some("gitignore"));
/// assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
/// assert_eq!(extension_of("Makefile"), None);
/// ```
#[must_use]
pub fn extension_of(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deny() -> DenyLists {
        DenyLists::default()
    }

    #[test]
    fn test_keep_regular_source() {
        assert_eq!(
            classify(Path::new("pkg/src/main.php"), false, &deny()),
            Verdict::Keep
        );
        assert_eq!(classify(Path::new("pkg/src"), true, &deny()), Verdict::Keep);
    }

    #[test]
    fn test_denied_basename() {
        for name in ["LICENSE", "Makefile", ".gitignore", "phpunit.xml.dist"] {
            let path = Path::new("pkg").join(name);
            assert_eq!(
                classify(&path, false, &deny()),
                Verdict::RemoveEntry,
                "{name} should be removed"
            );
        }
    }

    #[test]
    fn test_denied_extension_any_case() {
        assert_eq!(
            classify(Path::new("pkg/README.md"), false, &deny()),
            Verdict::RemoveEntry
        );
        assert_eq!(
            classify(Path::new("pkg/UPGRADE.MD"), false, &deny()),
            Verdict::RemoveEntry
        );
        assert_eq!(
            classify(Path::new("pkg/cache.Pyc"), false, &deny()),
            Verdict::RemoveEntry
        );
    }

    #[test]
    fn test_denied_directory_is_tree() {
        assert_eq!(classify(Path::new(".git"), true, &deny()), Verdict::RemoveTree);
        assert_eq!(
            classify(Path::new("pkg/Tests"), true, &deny()),
            Verdict::RemoveTree
        );
    }

    #[test]
    fn test_descendants_of_denied_directory() {
        assert_eq!(
            classify(Path::new("pkg/tests/Fixture.php"), false, &deny()),
            Verdict::InsideDeniedDirectory
        );
        assert_eq!(
            classify(Path::new("pkg/doc/api/index.html"), false, &deny()),
            Verdict::InsideDeniedDirectory
        );
        assert_eq!(
            classify(Path::new("pkg/.git/objects"), true, &deny()),
            Verdict::InsideDeniedDirectory
        );
    }

    #[test]
    fn test_file_named_like_denied_directory_is_kept() {
        // Directory names only apply to directories and ancestors.
        assert_eq!(classify(Path::new("pkg/test"), false, &deny()), Verdict::Keep);
    }

    #[test]
    fn test_directory_named_like_denied_file_is_kept() {
        assert_eq!(classify(Path::new("pkg/LICENSE"), true, &deny()), Verdict::Keep);
        assert_eq!(classify(Path::new("pkg/notes.md"), true, &deny()), Verdict::Keep);
    }

    #[test]
    fn test_case_sensitive_directory_names() {
        assert_eq!(
            classify(Path::new("pkg/TESTS/a.php"), false, &deny()),
            Verdict::Keep
        );
    }

    #[test]
    fn test_vendor_root_is_kept() {
        assert_eq!(classify(Path::new(""), true, &deny()), Verdict::Keep);
    }

    #[test]
    fn test_extension_of_edge_cases() {
        assert_eq!(extension_of("name."), Some(""));
        assert_eq!(extension_of(""), None);
        assert_eq!(extension_of("a.b.c"), Some("c"));
    }

    #[test]
    fn test_verdict_is_removed() {
        assert!(!Verdict::Keep.is_removed());
        assert!(Verdict::RemoveEntry.is_removed());
        assert!(Verdict::RemoveTree.is_removed());
        assert!(Verdict::InsideDeniedDirectory.is_removed());
    }
}
