//! Output formatter trait for CLI results.

use anyhow::Result;
use paerius_core::ArchiveManifest;
use paerius_core::BuildReport;
use paerius_core::PruneReport;
use paerius_core::VerificationReport;
use paerius_core::prune::PrunePlan;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format build result
    fn format_build_result(&self, report: &BuildReport) -> Result<()>;

    /// Format prune result
    fn format_prune_result(&self, report: &PruneReport) -> Result<()>;

    /// Format a dry-run prune plan
    fn format_prune_plan(&self, plan: &PrunePlan) -> Result<()>;

    /// Format archive listing (names only)
    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()>;

    /// Format archive listing with details
    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool)
    -> Result<()>;

    /// Format verification report
    fn format_verification_report(&self, report: &VerificationReport) -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(JsonOutput::success("build", 3)).unwrap();
        assert_eq!(json["operation"], "build");
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], 3);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_value(JsonOutput::error("verify", "bad")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "bad");
        assert!(json.get("data").is_none());
    }
}
