//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use paerius_core::ArchiveManifest;
use paerius_core::BuildReport;
use paerius_core::PruneReport;
use paerius_core::VerificationReport;
use paerius_core::prune::PrunePlan;
use paerius_core::prune::RemovalKind;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct PruneOutput {
    files_removed: usize,
    directories_removed: usize,
    bytes_removed: u64,
    duration_ms: u128,
}

impl From<&PruneReport> for PruneOutput {
    fn from(report: &PruneReport) -> Self {
        Self {
            files_removed: report.files_removed,
            directories_removed: report.directories_removed,
            bytes_removed: report.bytes_removed,
            duration_ms: report.duration.as_millis(),
        }
    }
}

#[derive(Serialize)]
struct EntryOutput {
    name: String,
    size: u64,
    compressed_size: u64,
    mtime: u32,
    crc32: String,
    permissions: String,
    compression: String,
}

impl OutputFormatter for JsonFormatter {
    fn format_build_result(&self, report: &BuildReport) -> Result<()> {
        #[derive(Serialize)]
        struct BuildOutput {
            archive_path: String,
            alias: String,
            compression: String,
            files_added: usize,
            bytes_written: u64,
            bytes_compressed: u64,
            compression_percentage: f64,
            archive_size: u64,
            signature: String,
            created_at: String,
            prune: PruneOutput,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = BuildOutput {
            archive_path: report.archive_path.display().to_string(),
            alias: report.alias.clone(),
            compression: report.compression.to_string(),
            files_added: report.files_added,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_percentage: report.compression_percentage(),
            archive_size: report.archive_size,
            signature: report.signature.clone(),
            created_at: report.created_at.clone(),
            prune: PruneOutput::from(&report.prune),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("build", data))
    }

    fn format_prune_result(&self, report: &PruneReport) -> Result<()> {
        Self::output(&JsonOutput::success("prune", PruneOutput::from(report)))
    }

    fn format_prune_plan(&self, plan: &PrunePlan) -> Result<()> {
        #[derive(Serialize)]
        struct PlannedOutput {
            path: String,
            kind: &'static str,
        }

        #[derive(Serialize)]
        struct PlanOutput {
            dry_run: bool,
            total: usize,
            removals: Vec<PlannedOutput>,
        }

        let data = PlanOutput {
            dry_run: true,
            total: plan.len(),
            removals: plan
                .removals()
                .iter()
                .map(|removal| PlannedOutput {
                    path: removal.relative.display().to_string(),
                    kind: match removal.kind {
                        RemovalKind::Entry => "entry",
                        RemovalKind::Tree => "tree",
                    },
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("prune", data))
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        #[derive(Serialize)]
        struct ShortOutput {
            alias: String,
            total_entries: usize,
            entries: Vec<String>,
        }

        let data = ShortOutput {
            alias: manifest.alias.clone(),
            total_entries: manifest.total_entries,
            entries: manifest.entries.iter().map(|e| e.name.clone()).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_manifest_long(
        &self,
        manifest: &ArchiveManifest,
        _human_readable: bool,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct SignatureOutput {
            algorithm: String,
            digest: String,
        }

        #[derive(Serialize)]
        struct LongOutput {
            path: String,
            alias: String,
            api_version: String,
            compression: String,
            created_at: Option<String>,
            total_entries: usize,
            total_size: u64,
            stored_size: u64,
            archive_size: u64,
            signature: Option<SignatureOutput>,
            entries: Vec<EntryOutput>,
        }

        let data = LongOutput {
            path: manifest.path.display().to_string(),
            alias: manifest.alias.clone(),
            api_version: manifest.api_version.clone(),
            compression: manifest.compression.to_string(),
            created_at: manifest.created_at.clone(),
            total_entries: manifest.total_entries,
            total_size: manifest.total_size,
            stored_size: manifest.stored_size,
            archive_size: manifest.archive_size,
            signature: manifest.signature.as_ref().map(|s| SignatureOutput {
                algorithm: s.algorithm.clone(),
                digest: s.digest.clone(),
            }),
            entries: manifest
                .entries
                .iter()
                .map(|e| EntryOutput {
                    name: e.name.clone(),
                    size: e.size,
                    compressed_size: e.compressed_size,
                    mtime: e.mtime,
                    crc32: format!("{:08x}", e.crc32),
                    permissions: format!("{:o}", e.permissions),
                    compression: e.compression.to_string(),
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        #[derive(Serialize)]
        struct IssueOutput {
            kind: String,
            entry: Option<String>,
            message: String,
        }

        #[derive(Serialize)]
        struct VerifyOutput {
            ok: bool,
            signature_status: String,
            entries_status: String,
            total_entries: usize,
            failed_entries: usize,
            issues: Vec<IssueOutput>,
        }

        let data = VerifyOutput {
            ok: report.is_ok(),
            signature_status: report.signature_status.to_string(),
            entries_status: report.entries_status.to_string(),
            total_entries: report.total_entries,
            failed_entries: report.failed_entries,
            issues: report
                .issues
                .iter()
                .map(|issue| IssueOutput {
                    kind: issue.kind.to_string(),
                    entry: issue.entry.clone(),
                    message: issue.message.clone(),
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("verify", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_prune_output_fields() {
        let report = PruneReport {
            files_removed: 3,
            directories_removed: 2,
            bytes_removed: 4096,
            duration: Duration::from_millis(15),
        };
        let json = serde_json::to_value(PruneOutput::from(&report)).unwrap();
        assert_eq!(json["files_removed"], 3);
        assert_eq!(json["directories_removed"], 2);
        assert_eq!(json["bytes_removed"], 4096);
        assert_eq!(json["duration_ms"], 15);
    }

    #[test]
    fn test_entry_output_encodes_hex_and_octal() {
        let entry = EntryOutput {
            name: "autoload.php".into(),
            size: 10,
            compressed_size: 8,
            mtime: 0,
            crc32: format!("{:08x}", 0xbeef_u32),
            permissions: format!("{:o}", 0o644),
            compression: "gzip".into(),
        };
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["crc32"], "0000beef");
        assert_eq!(json["permissions"], "644");
    }
}
