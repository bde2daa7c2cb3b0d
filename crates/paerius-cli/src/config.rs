//! Optional TOML configuration file, merged with command-line flags.
//!
//! ```toml
//! name = "app.phar"
//! compression = "gz"
//! compression_level = 9
//!
//! [deny]
//! extra_directories = ["benchmarks"]
//! extra_extensions = ["rst"]
//! ```

use anyhow::Context;
use anyhow::Result;
use paerius_core::DenyLists;
use paerius_core::PackConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "paerius.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub name: Option<String>,
    pub compression: Option<String>,
    pub compression_level: Option<u8>,
    pub deny: DenyConfig,
}

/// `[deny]` table. Plain keys replace a default list, `extra_*` keys extend it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DenyConfig {
    pub basenames: Option<Vec<String>>,
    pub directories: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub extra_basenames: Vec<String>,
    pub extra_directories: Vec<String>,
    pub extra_extensions: Vec<String>,
}

impl DenyConfig {
    pub fn to_deny_lists(&self) -> DenyLists {
        let mut deny = DenyLists::default();
        if let Some(basenames) = &self.basenames {
            deny = deny.with_basenames(basenames.iter().cloned());
        }
        if let Some(directories) = &self.directories {
            deny = deny.with_directories(directories.iter().cloned());
        }
        if let Some(extensions) = &self.extensions {
            deny = deny.with_extensions(extensions);
        }
        deny.with_extra_basenames(self.extra_basenames.iter().cloned())
            .with_extra_directories(self.extra_directories.iter().cloned())
            .with_extra_extensions(&self.extra_extensions)
    }
}

/// Values given on the command line, which win over the file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub name: Option<String>,
    pub compression: Option<String>,
    pub compression_level: Option<u8>,
}

/// Merged settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pack: PackConfig,
    pub compression: Option<String>,
}

/// Loads `explicit`, or `paerius.toml` in `workdir` if it exists.
///
/// A missing explicit file is an error; a missing default file is not.
pub fn load(explicit: Option<&Path>, workdir: &Path) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return read(path);
    }

    let default = workdir.join(DEFAULT_CONFIG_FILE);
    if default.is_file() {
        read(&default)
    } else {
        Ok(FileConfig::default())
    }
}

fn read(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration file '{}'", path.display()))?;
    let config = toml::from_str(&text)
        .with_context(|| format!("invalid configuration file '{}'", path.display()))?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

pub fn merge(file: FileConfig, cli: CliOverrides) -> Settings {
    let mut pack = PackConfig::default().with_deny(file.deny.to_deny_lists());

    if let Some(name) = cli.name.or(file.name) {
        pack = pack.with_base_name(name);
    }
    if let Some(level) = cli.compression_level.or(file.compression_level) {
        pack = pack.with_compression_level(Some(level));
    }

    Settings {
        pack,
        compression: cli.compression.or(file.compression),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            name = "app.phar"
            compression = "gz"
            compression_level = 9

            [deny]
            directories = ["tests"]
            extra_extensions = [".RST"]
            "#,
        )
        .unwrap();

        assert_eq!(config.name.as_deref(), Some("app.phar"));
        assert_eq!(config.compression_level, Some(9));

        let deny = config.deny.to_deny_lists();
        assert!(deny.denies_directory("tests"));
        assert!(!deny.denies_directory(".git"));
        assert!(deny.denies_extension("rst"));
        assert!(deny.denies_extension("md"));
        assert!(deny.denies_basename("LICENSE"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<FileConfig>("nmae = \"typo\"").is_err());
        assert!(toml::from_str::<FileConfig>("[deny]\nfoo = []").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            name: Some("file.phar".into()),
            compression: Some("bz".into()),
            compression_level: Some(3),
            deny: DenyConfig::default(),
        };
        let cli = CliOverrides {
            name: Some("cli.phar".into()),
            compression: None,
            compression_level: Some(8),
        };

        let settings = merge(file, cli);
        assert_eq!(settings.pack.base_name, "cli.phar");
        assert_eq!(settings.pack.compression_level, Some(8));
        assert_eq!(settings.compression.as_deref(), Some("bz"));
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = merge(FileConfig::default(), CliOverrides::default());
        assert_eq!(settings.pack, PackConfig::default());
        assert!(settings.compression.is_none());
    }

    #[test]
    fn test_load_default_file_from_workdir() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load(None, temp.path()).unwrap(), FileConfig::default());

        fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "name = \"w.phar\"").unwrap();
        let config = load(None, temp.path()).unwrap();
        assert_eq!(config.name.as_deref(), Some("w.phar"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let err = load(Some(&temp.path().join("nope.toml")), temp.path()).unwrap_err();
        assert!(err.to_string().contains("cannot read configuration file"));
    }
}
