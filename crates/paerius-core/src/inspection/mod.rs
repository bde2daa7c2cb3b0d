//! Inspection of built archives.
//!
//! # Examples
//!
//! ```no_run
//! use paerius_core::list_archive;
//! use paerius_core::verify_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = list_archive("/srv/app/vendor.phar")?;
//! println!("archive holds {} files", manifest.total_entries);
//!
//! let report = verify_archive("/srv/app/vendor.phar")?;
//! if !report.is_ok() {
//!     for issue in &report.issues {
//!         eprintln!("{issue}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod list;
pub mod manifest;
pub mod report;
pub mod verify;

pub use list::list_archive;
pub use manifest::ArchiveEntry;
pub use manifest::ArchiveManifest;
pub use manifest::SignatureInfo;
pub use report::CheckStatus;
pub use report::IssueKind;
pub use report::VerificationIssue;
pub use report::VerificationReport;
pub use verify::verify_archive;
