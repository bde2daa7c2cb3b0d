//! Configuration for pruning and packaging.

use crate::PackError;
use crate::Result;
use crate::prune::DenyLists;
use std::path::Component;
use std::path::Path;

/// Default file name of the archive written into the working directory.
pub const DEFAULT_BASE_NAME: &str = "vendor.phar";

/// Configuration for [`crate::VendorPacker`].
///
/// # Examples
///
/// ```
/// use paerius_core::PackConfig;
/// use paerius_core::prune::DenyLists;
///
/// let config = PackConfig::default()
///     .with_base_name("app.phar")
///     .with_compression_level(Some(9))
///     .with_deny(DenyLists::default().with_extra_directories(["benchmarks"]));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.base_name, "app.phar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Archive file name, also used as the archive alias.
    ///
    /// Default: `"vendor.phar"`.
    pub base_name: String,

    /// What pruning removes.
    ///
    /// Default: [`DenyLists::default`].
    pub deny: DenyLists,

    /// Compression level (1-9).
    ///
    /// `None` uses the codec's own default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            base_name: DEFAULT_BASE_NAME.to_string(),
            deny: DenyLists::default(),
            compression_level: Some(6),
        }
    }
}

impl PackConfig {
    /// Sets the archive file name.
    #[must_use]
    pub fn with_base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = name.into();
        self
    }

    /// Sets the deny-lists used by pruning.
    #[must_use]
    pub fn with_deny(mut self, deny: DenyLists) -> Self {
        self.deny = deny;
        self
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Configuration`] if the base name is not a plain
    /// file name, or [`PackError::InvalidCompressionLevel`] if the level is
    /// outside 1-9.
    pub fn validate(&self) -> Result<()> {
        validate_base_name(&self.base_name)?;

        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(PackError::InvalidCompressionLevel { level });
        }
        Ok(())
    }
}

fn validate_base_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PackError::configuration(name, "archive name is empty"));
    }

    let mut components = Path::new(name).components();
    let plain = matches!(components.next(), Some(Component::Normal(n)) if n == name)
        && components.next().is_none()
        && !name.contains(['/', '\\']);

    if plain {
        Ok(())
    } else {
        Err(PackError::configuration(
            name,
            "archive name must be a plain file name",
        ))
    }
}
