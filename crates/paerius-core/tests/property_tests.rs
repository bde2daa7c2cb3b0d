//! Property-based tests for entry classification.

#![allow(clippy::unwrap_used)]

use paerius_core::prune::DenyLists;
use paerius_core::prune::Verdict;
use paerius_core::prune::classify;
use paerius_core::prune::deny::DEFAULT_DIRECTORIES;
use proptest::prelude::*;
use std::path::PathBuf;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

proptest! {
    /// Anything below a denied directory goes, whatever its own name.
    #[test]
    fn prop_denied_ancestor_removes_descendants(
        prefix in prop::collection::vec(segment(), 0..3),
        denied in prop::sample::select(DEFAULT_DIRECTORIES),
        suffix in prop::collection::vec(segment(), 1..4),
        is_dir in any::<bool>(),
    ) {
        let path: PathBuf = prefix
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(denied))
            .chain(suffix.iter().map(String::as_str))
            .collect();

        prop_assert_eq!(
            classify(&path, is_dir, &DenyLists::default()),
            Verdict::InsideDeniedDirectory
        );
    }

    /// With empty deny-lists nothing is ever removed.
    #[test]
    fn prop_empty_lists_keep_everything(
        parts in prop::collection::vec("[A-Za-z0-9._-]{1,12}", 1..5),
        is_dir in any::<bool>(),
    ) {
        let path: PathBuf = parts.iter().collect();
        prop_assert_eq!(classify(&path, is_dir, &DenyLists::empty()), Verdict::Keep);
    }

    /// Extension matching ignores case.
    #[test]
    fn prop_extension_case_insensitive(
        stem in segment(),
        ext in prop::sample::select(vec!["md", "MD", "Md", "markdown", "PYC", "hprof"]),
    ) {
        let path = PathBuf::from("pkg").join(format!("{stem}.{ext}"));
        prop_assert_eq!(
            classify(&path, false, &DenyLists::default()),
            Verdict::RemoveEntry
        );
    }

    /// Directories are never removed for their extension or basename.
    #[test]
    fn prop_directories_ignore_file_rules(
        stem in segment(),
    ) {
        let deny = DenyLists::default();
        let path = PathBuf::from("pkg").join(format!("{stem}.md"));
        prop_assume!(!deny.denies_directory(&format!("{stem}.md")));
        prop_assert_eq!(classify(&path, true, &deny), Verdict::Keep);
    }
}
