//! Verify command implementation.

use crate::cli::VerifyArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use paerius_core::verify_archive;

pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let report = add_context(verify_archive(&args.archive), &args.archive)?;

    formatter.format_verification_report(&report)?;

    if !report.is_ok() {
        bail!(
            "Archive verification failed: {} issue(s) in '{}'",
            report.issues.len(),
            args.archive.display()
        );
    }
    Ok(())
}
