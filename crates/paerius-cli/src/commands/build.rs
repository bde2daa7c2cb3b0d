//! Build command implementation.

use crate::cli::BuildArgs;
use crate::config;
use crate::config::CliOverrides;
use crate::error::add_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use paerius_core::VendorPacker;
use std::path::Path;
use tracing::debug;

pub fn execute(
    args: &BuildArgs,
    config_path: Option<&Path>,
    formatter: &dyn OutputFormatter,
    quiet: bool,
) -> Result<()> {
    let workdir = args.workdir();
    let file = config::load(config_path, &workdir)?;
    let settings = config::merge(
        file,
        CliOverrides {
            name: args.name.clone(),
            compression: args.compression.clone(),
            compression_level: args.compression_level,
        },
    );
    debug!(?settings, "resolved build settings");

    let packer = add_context(VendorPacker::with_config(&workdir, settings.pack), &workdir)?;
    let archive_path = packer.archive_path();
    let compression = settings.compression.as_deref();

    let report = if !quiet && CliProgress::should_show() {
        let mut progress = CliProgress::new("Packing");
        packer.build_with_progress(compression, &mut progress)
    } else {
        packer.build(compression)
    };
    let report = add_context(report, &archive_path)?;

    formatter.format_build_result(&report)
}
