//! Archive verification.

use crate::Result;
use crate::inspection::report::CheckStatus;
use crate::inspection::report::IssueKind;
use crate::inspection::report::VerificationIssue;
use crate::inspection::report::VerificationReport;
use crate::phar::PharArchive;
use crate::phar::PharEntry;
use crate::phar::PharSignature;
use sha2::Digest;
use sha2::Sha256;
use sha2::Sha512;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Checks the signature and every stored file of an archive.
///
/// The digest is recomputed over the signed bytes, and every file is
/// decompressed and compared with its recorded size and CRC32.
///
/// # Errors
///
/// Returns [`crate::PackError::Io`] if the file cannot be read and
/// [`crate::PackError::InvalidArchive`] if its structure cannot be parsed.
/// Content problems are reported in [`VerificationReport::issues`], not as
/// errors.
///
/// # Examples
///
/// ```no_run
/// use paerius_core::verify_archive;
///
/// let report = verify_archive("/srv/app/vendor.phar")?;
/// if report.is_ok() {
///     println!("{} files verified", report.total_entries);
/// }
/// # Ok::<(), paerius_core::PackError>(())
/// ```
pub fn verify_archive<P: AsRef<Path>>(archive_path: P) -> Result<VerificationReport> {
    let path = archive_path.as_ref();
    let archive = PharArchive::parse(fs::read(path)?)?;

    let mut issues = Vec::new();
    let signature_status = check_signature(&archive, &mut issues);

    let mut failed_entries = 0;
    for entry in archive.entries() {
        let before = issues.len();
        check_entry(&archive, entry, &mut issues);
        if issues.len() > before {
            failed_entries += 1;
        }
    }

    let entries_status = if failed_entries == 0 {
        CheckStatus::Pass
    } else {
        CheckStatus::Fail
    };

    debug!(
        archive = %path.display(),
        %signature_status,
        %entries_status,
        "verified archive"
    );

    Ok(VerificationReport {
        signature_status,
        entries_status,
        total_entries: archive.entries().len(),
        failed_entries,
        issues,
    })
}

fn check_signature(archive: &PharArchive, issues: &mut Vec<VerificationIssue>) -> CheckStatus {
    let Some(signature) = archive.signature() else {
        issues.push(VerificationIssue {
            kind: IssueKind::Unsigned,
            entry: None,
            message: "archive has no signature".into(),
        });
        return CheckStatus::Skipped;
    };

    let Some(actual) = digest(signature, archive.signed_bytes()) else {
        issues.push(VerificationIssue {
            kind: IssueKind::UnsupportedSignature,
            entry: None,
            message: format!("{} signatures are not checked", signature.algorithm_name()),
        });
        return CheckStatus::Skipped;
    };

    if actual == signature.digest {
        CheckStatus::Pass
    } else {
        issues.push(VerificationIssue {
            kind: IssueKind::SignatureMismatch,
            entry: None,
            message: format!(
                "{} digest {}, expected {}",
                signature.algorithm_name(),
                hex::encode(&actual),
                hex::encode(&signature.digest)
            ),
        });
        CheckStatus::Fail
    }
}

fn digest(signature: &PharSignature, bytes: &[u8]) -> Option<Vec<u8>> {
    match signature.algorithm {
        0x0003 => Some(Sha256::digest(bytes).to_vec()),
        0x0004 => Some(Sha512::digest(bytes).to_vec()),
        _ => None,
    }
}

fn check_entry(archive: &PharArchive, entry: &PharEntry, issues: &mut Vec<VerificationIssue>) {
    let data = match archive.read(entry) {
        Ok(data) => data,
        Err(e) => {
            issues.push(VerificationIssue {
                kind: IssueKind::Corrupt,
                entry: Some(entry.name.clone()),
                message: format!("cannot decompress {} data: {e}", entry.compression()),
            });
            return;
        }
    };

    if data.len() as u64 != u64::from(entry.size) {
        issues.push(VerificationIssue {
            kind: IssueKind::SizeMismatch,
            entry: Some(entry.name.clone()),
            message: format!("{} bytes, expected {}", data.len(), entry.size),
        });
    }

    let mut crc = flate2::Crc::new();
    crc.update(&data);
    if crc.sum() != entry.crc32 {
        issues.push(VerificationIssue {
            kind: IssueKind::ChecksumMismatch,
            entry: Some(entry.name.clone()),
            message: format!("crc32 {:#010x}, expected {:#010x}", crc.sum(), entry.crc32),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::VendorPacker;
    use crate::test_utils::VendorTree;

    fn built(compression: &str) -> (VendorTree, std::path::PathBuf) {
        let tree = VendorTree::new()
            .file("autoload.php", "<?php require 'acme/src/A.php';")
            .file("acme/src/A.php", "<?php class A {}\n".repeat(20));
        let report = VendorPacker::new(tree.working())
            .unwrap()
            .build(Some(compression))
            .unwrap();
        (tree, report.archive_path)
    }

    #[test]
    fn test_fresh_archive_passes() {
        let (_tree, path) = built("none");
        let report = verify_archive(&path).unwrap();

        assert!(report.is_ok());
        assert_eq!(report.signature_status, CheckStatus::Pass);
        assert_eq!(report.total_entries, 2);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_tampered_content_is_flagged() {
        let (_tree, path) = built("none");
        let mut bytes = fs::read(&path).unwrap();
        let at = bytes
            .windows(5)
            .rposition(|w| w == b"class")
            .unwrap();
        bytes[at] = b'C';
        fs::write(&path, &bytes).unwrap();

        let report = verify_archive(&path).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.signature_status, CheckStatus::Fail);
        assert_eq!(report.failed_entries, 1);
        assert!(
            report
                .issues
                .iter()
                .any(|i| i.kind == IssueKind::ChecksumMismatch
                    && i.entry.as_deref() == Some("acme/src/A.php"))
        );
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_corrupt_stream_is_flagged() {
        let (_tree, path) = built("gz");
        let archive = PharArchive::parse(fs::read(&path).unwrap()).unwrap();
        let entry = archive
            .entries()
            .iter()
            .find(|e| e.name == "acme/src/A.php")
            .unwrap();
        let raw = archive.raw(entry).to_vec();

        let mut bytes = fs::read(&path).unwrap();
        let offset = bytes
            .windows(raw.len())
            .position(|w| w == raw.as_slice())
            .unwrap();
        for b in &mut bytes[offset..offset + raw.len()] {
            *b = 0xff;
        }
        fs::write(&path, &bytes).unwrap();

        let report = verify_archive(&path).unwrap();
        assert!(!report.is_ok());
        assert!(report.issues.iter().any(|i| i.kind == IssueKind::Corrupt));
    }
}
