//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use paerius_core::ArchiveManifest;
use paerius_core::BuildReport;
use paerius_core::PruneReport;
use paerius_core::VerificationReport;
use paerius_core::inspection::CheckStatus;
use paerius_core::prune::PrunePlan;
use paerius_core::prune::RemovalKind;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn headline(&self, text: &str) {
        if self.use_colors {
            self.line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            self.line(text);
        }
    }

    fn status(&self, status: CheckStatus) -> String {
        if !self.use_colors {
            return status.to_string();
        }
        match status {
            CheckStatus::Pass => style("pass").green().to_string(),
            CheckStatus::Fail => style("fail").red().bold().to_string(),
            CheckStatus::Skipped => style("skipped").yellow().to_string(),
        }
    }

    fn prune_lines(&self, report: &PruneReport) {
        self.line(&format!(
            "  Files removed:    {}",
            Self::format_number(report.files_removed)
        ));
        self.line(&format!(
            "  Dirs removed:     {}",
            Self::format_number(report.directories_removed)
        ));
        self.line(&format!(
            "  Space reclaimed:  {}",
            Self::format_size(report.bytes_removed)
        ));
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_build_result(&self, report: &BuildReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!(
            "Archive created: {}",
            report.archive_path.display()
        ));

        self.line("");
        self.prune_lines(&report.prune);
        self.line(&format!(
            "  Files packed:     {}",
            Self::format_number(report.files_added)
        ));
        self.line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        self.line(&format!("  Compression:      {}", report.compression));
        if report.bytes_compressed < report.bytes_written {
            self.line(&format!(
                "  Compressed size:  {} ({:.1}% saved)",
                Self::format_size(report.bytes_compressed),
                report.compression_percentage()
            ));
        }
        self.line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_size)
        ));

        if self.verbose {
            self.line(&format!("  Alias:            {}", report.alias));
            self.line(&format!("  Created at:       {}", report.created_at));
            self.line(&format!("  SHA-256:          {}", report.signature));
            self.line(&format!("  Duration:         {:?}", report.duration));
        }

        if report.has_warnings() {
            self.line("");
            if self.use_colors {
                self.line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                self.line("Warnings:");
            }
            for warning in &report.warnings {
                self.line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_prune_result(&self, report: &PruneReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline("Vendor tree pruned");
        self.prune_lines(report);
        if self.verbose {
            self.line(&format!("  Duration:         {:?}", report.duration));
        }
        Ok(())
    }

    fn format_prune_plan(&self, plan: &PrunePlan) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if plan.is_empty() {
            self.line("Nothing to remove");
            return Ok(());
        }

        for removal in plan.removals() {
            let suffix = match removal.kind {
                RemovalKind::Entry => "",
                RemovalKind::Tree => "/",
            };
            self.line(&format!(
                "would remove {}{suffix}",
                removal.relative.display()
            ));
        }
        self.line("");
        self.line(&format!(
            "Total: {} paths (dry run, nothing deleted)",
            Self::format_number(plan.len())
        ));
        Ok(())
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &manifest.entries {
            self.line(&entry.name);
        }

        Ok(())
    }

    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&format!(
            "Alias: {}  API: {}  Compression: {}",
            manifest.alias, manifest.api_version, manifest.compression
        ));
        if let Some(created_at) = &manifest.created_at {
            self.line(&format!("Created: {created_at}"));
        }
        if let Some(signature) = &manifest.signature {
            self.line(&format!(
                "Signature: {} {}",
                signature.algorithm, signature.digest
            ));
        }
        self.line("");

        for entry in &manifest.entries {
            let (size, stored) = if human_readable {
                (
                    Self::format_size(entry.size),
                    Self::format_size(entry.compressed_size),
                )
            } else {
                (entry.size.to_string(), entry.compressed_size.to_string())
            };

            self.line(&format!(
                "{:04o} {:>10} {:>10}  {:08x}  {}",
                entry.permissions, size, stored, entry.crc32, entry.name
            ));
        }

        self.line("");
        self.line(&format!(
            "Total: {} files, {} ({} stored, archive {})",
            Self::format_number(manifest.total_entries),
            Self::format_size(manifest.total_size),
            Self::format_size(manifest.stored_size),
            Self::format_size(manifest.archive_size)
        ));

        Ok(())
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let verdict = match (report.is_ok(), self.use_colors) {
            (true, true) => style("PASSED").green().bold().to_string(),
            (false, true) => style("FAILED").red().bold().to_string(),
            (true, false) => "PASSED".to_string(),
            (false, false) => "FAILED".to_string(),
        };
        self.line(&format!("Archive verification: {verdict}"));
        self.line(&format!(
            "  Signature: {}",
            self.status(report.signature_status)
        ));
        self.line(&format!("  Entries: {}", self.status(report.entries_status)));
        self.line(&format!(
            "  Total entries: {}",
            Self::format_number(report.total_entries)
        ));
        if report.failed_entries > 0 {
            self.line(&format!("  Failed entries: {}", report.failed_entries));
        }

        if !report.issues.is_empty() {
            self.line("");
            self.line("Issues:");
            for issue in &report.issues {
                self.line(&format!("  {issue}"));
            }
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }
}
