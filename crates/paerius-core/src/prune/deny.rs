//! Deny-lists deciding which vendor entries are not needed at runtime.

use std::collections::BTreeSet;

/// File names removed wherever they appear.
pub const DEFAULT_BASENAMES: &[&str] = &[
    "LICENSE",
    ".styleci.yml",
    ".travis.yml",
    ".gitattributes",
    "phpunit.xml.dist",
    "README.rst",
    "CHANGELOG",
    "CHANGES",
    "README",
    "VERSION",
    ".php_cs.dist",
    ".php_cs",
    ".editorconfig",
    "php_cs.xml",
    "phpunit.xml",
    "phpcs.xml",
    ".codecov.yml",
    "AUTHORS",
    "Makefile",
    ".gitignore",
];

/// Directory names whose whole subtree is removed.
pub const DEFAULT_DIRECTORIES: &[&str] = &[
    ".git", "tests", "Tests", "test", "doc", "testing", "test_old", ".svn", ".cvs", ".idea",
    ".DS_Store", ".hg",
];

/// Extensions (compared lowercase) removed wherever they appear.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "gitignore", "markdown", "hprof", "pyc"];

/// Immutable lookup tables used to classify vendor entries.
///
/// Basenames and directory names match exactly. Extensions are stored
/// lowercase and matched against the lowercased extension of an entry.
///
/// # Examples
///
/// ```
/// use paerius_core::prune::DenyLists;
///
/// let deny = DenyLists::default()
///     .with_extra_directories(["benchmarks"])
///     .with_extra_extensions(["RST"]);
///
/// assert!(deny.denies_directory("benchmarks"));
/// assert!(deny.denies_extension("rst"));
/// assert!(deny.denies_basename("LICENSE"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyLists {
    basenames: BTreeSet<String>,
    directories: BTreeSet<String>,
    extensions: BTreeSet<String>,
}

impl Default for DenyLists {
    fn default() -> Self {
        Self {
            basenames: collect(DEFAULT_BASENAMES),
            directories: collect(DEFAULT_DIRECTORIES),
            extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        }
    }
}

impl DenyLists {
    /// Creates deny-lists with the default sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates deny-lists that match nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            basenames: BTreeSet::new(),
            directories: BTreeSet::new(),
            extensions: BTreeSet::new(),
        }
    }

    /// Replaces the basename set.
    #[must_use]
    pub fn with_basenames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.basenames = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the directory-name set.
    #[must_use]
    pub fn with_directories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directories = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the extension set. Leading dots are ignored.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions.into_iter().map(normalize_extension).collect();
        self
    }

    /// Adds basenames to the current set.
    #[must_use]
    pub fn with_extra_basenames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.basenames.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds directory names to the current set.
    #[must_use]
    pub fn with_extra_directories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directories.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds extensions to the current set. Leading dots are ignored.
    #[must_use]
    pub fn with_extra_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions
            .extend(extensions.into_iter().map(normalize_extension));
        self
    }

    /// Returns `true` if a file with exactly this name is removed.
    #[must_use]
    pub fn denies_basename(&self, name: &str) -> bool {
        self.basenames.contains(name)
    }

    /// Returns `true` if a directory with exactly this name is removed.
    #[must_use]
    pub fn denies_directory(&self, name: &str) -> bool {
        self.directories.contains(name)
    }

    /// Returns `true` if this extension is removed, ignoring case.
    #[must_use]
    pub fn denies_extension(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_ascii_lowercase())
    }

    /// Denied basenames in sorted order.
    pub fn basenames(&self) -> impl Iterator<Item = &str> {
        self.basenames.iter().map(String::as_str)
    }

    /// Denied directory names in sorted order.
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.directories.iter().map(String::as_str)
    }

    /// Denied extensions (lowercase) in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

fn collect(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn normalize_extension<S: AsRef<str>>(ext: S) -> String {
    ext.as_ref().trim_start_matches('.').to_ascii_lowercase()
}
