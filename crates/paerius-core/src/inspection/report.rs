//! Verification results.

use std::fmt;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// The check succeeded.
    Pass,
    /// The check found a problem.
    Fail,
    /// The check could not run.
    Skipped,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skipped => "skipped",
        })
    }
}

/// Category of a verification issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// The archive carries no signature trailer.
    Unsigned,
    /// The signature algorithm cannot be checked.
    UnsupportedSignature,
    /// The recomputed digest differs from the stored one.
    SignatureMismatch,
    /// A stored file could not be decompressed.
    Corrupt,
    /// A file's decompressed size differs from its manifest record.
    SizeMismatch,
    /// A file's CRC32 differs from its manifest record.
    ChecksumMismatch,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsigned => "unsigned",
            Self::UnsupportedSignature => "unsupported-signature",
            Self::SignatureMismatch => "signature-mismatch",
            Self::Corrupt => "corrupt",
            Self::SizeMismatch => "size-mismatch",
            Self::ChecksumMismatch => "checksum-mismatch",
        })
    }
}

/// A problem found while verifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationIssue {
    /// Category.
    pub kind: IssueKind,
    /// Affected file, or `None` for archive-wide issues.
    pub entry: Option<String>,
    /// Description.
    pub message: String,
}

impl fmt::Display for VerificationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "[{}] {entry}: {}", self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Result of [`crate::verify_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Signature check.
    pub signature_status: CheckStatus,
    /// Per-file size and checksum checks.
    pub entries_status: CheckStatus,
    /// Number of files checked.
    pub total_entries: usize,
    /// Files with at least one issue.
    pub failed_entries: usize,
    /// Every problem found.
    pub issues: Vec<VerificationIssue>,
}

impl VerificationReport {
    /// Returns `true` if no check failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use paerius_core::inspection::CheckStatus;
    /// use paerius_core::inspection::VerificationReport;
    ///
    /// let report = VerificationReport {
    ///     signature_status: CheckStatus::Pass,
    ///     entries_status: CheckStatus::Pass,
    ///     total_entries: 3,
    ///     failed_entries: 0,
    ///     issues: Vec::new(),
    /// };
    /// assert!(report.is_ok());
    /// ```
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.signature_status != CheckStatus::Fail && self.entries_status != CheckStatus::Fail
    }
}
