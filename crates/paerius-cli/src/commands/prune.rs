//! Prune command implementation.

use crate::cli::PruneArgs;
use crate::config;
use crate::config::CliOverrides;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use paerius_core::VendorPacker;
use std::path::Path;

pub fn execute(
    args: &PruneArgs,
    config_path: Option<&Path>,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let workdir = args.workdir();
    let file = config::load(config_path, &workdir)?;
    let settings = config::merge(file, CliOverrides::default());

    let packer = add_context(VendorPacker::with_config(&workdir, settings.pack), &workdir)?;

    if args.dry_run {
        let plan = add_context(packer.plan_prune(), packer.vendor_path())?;
        formatter.format_prune_plan(&plan)
    } else {
        let report = add_context(packer.prune(), packer.vendor_path())?;
        formatter.format_prune_result(&report)
    }
}
