//! Vendor tree pruning and self-executing PHP archive packaging.
//!
//! `paerius-core` strips a project's `vendor` directory of files that are not
//! needed at runtime (tests, documentation, VCS metadata, build
//! configuration) and packs what remains into a signed Phar archive whose
//! stub loads the bundled `autoload.php`.
//!
//! # Examples
//!
//! ```no_run
//! use paerius_core::VendorPacker;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let packer = VendorPacker::new("/srv/app")?;
//! let report = packer.build(None)?;
//! println!(
//!     "removed {} files, packed {} into {}",
//!     report.prune.files_removed,
//!     report.files_added,
//!     report.archive_path.display()
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod compression;
pub mod config;
pub mod error;
pub mod inspection;
pub mod packer;
pub mod paths;
pub mod phar;
pub mod prune;
pub mod report;
pub mod walker;

#[doc(hidden)]
pub mod test_utils;

pub use compression::Compression;
pub use config::PackConfig;
pub use error::PackError;
pub use error::Result;
pub use inspection::ArchiveManifest;
pub use inspection::VerificationReport;
pub use inspection::list_archive;
pub use inspection::verify_archive;
pub use packer::VendorPacker;
pub use prune::DenyLists;
pub use report::BuildReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use report::PruneReport;
