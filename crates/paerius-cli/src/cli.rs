//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paerius")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (default: paerius.toml in the working directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prune the vendor directory and pack it into a Phar archive
    Build(BuildArgs),
    /// Remove non-runtime files from the vendor directory
    Prune(PruneArgs),
    /// List archive contents
    List(ListArgs),
    /// Verify archive signature and checksums
    Verify(VerifyArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Project directory containing `vendor/` (default: current directory)
    #[arg(value_name = "WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Archive file name, written into the project directory
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Force a codec: `bz`, `gz`, or anything else for none
    #[arg(short = 'z', long, value_name = "CODEC")]
    pub compression: Option<String>,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,
}

#[derive(clap::Args)]
pub struct PruneArgs {
    /// Project directory containing `vendor/` (default: current directory)
    #[arg(value_name = "WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Show what would be removed without deleting anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show detailed file information
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

impl BuildArgs {
    pub fn workdir(&self) -> PathBuf {
        self.workdir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl PruneArgs {
    pub fn workdir(&self) -> PathBuf {
        self.workdir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["paerius", "build"]).unwrap_or_else(|e| panic!("{e}"));
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.workdir(), PathBuf::from("."));
        assert!(args.name.is_none());
        assert!(args.compression.is_none());
    }

    #[test]
    fn test_compression_level_range() {
        assert!(Cli::try_parse_from(["paerius", "build", "-l", "0"]).is_err());
        assert!(Cli::try_parse_from(["paerius", "build", "-l", "10"]).is_err());
        assert!(Cli::try_parse_from(["paerius", "build", "-l", "9"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["paerius", "prune", "app", "--dry-run", "--json"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(cli.json);
        let Commands::Prune(args) = cli.command else {
            panic!("expected prune");
        };
        assert!(args.dry_run);
        assert_eq!(args.workdir(), PathBuf::from("app"));
    }
}
