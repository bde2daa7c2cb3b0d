//! Vendor tree pruning.
//!
//! Pruning runs in two phases. [`plan_prune`] walks the vendor tree and
//! classifies every entry with the pure [`classify`] function, producing a
//! [`PrunePlan`]. [`PrunePlan::apply`] then deletes the planned paths deepest
//! first. [`prune`] runs both phases.
//!
//! # Examples
//!
//! ```no_run
//! use paerius_core::prune::DenyLists;
//! use paerius_core::prune::prune;
//!
//! let report = prune("/srv/app/vendor".as_ref(), &DenyLists::default())?;
//! println!("removed {} files", report.files_removed);
//! # Ok::<(), paerius_core::PackError>(())
//! ```

pub mod classify;
pub mod deny;
pub mod plan;

pub use classify::Verdict;
pub use classify::classify;
pub use deny::DenyLists;
pub use plan::PlannedRemoval;
pub use plan::PrunePlan;
pub use plan::RemovalKind;
pub use plan::plan_prune;

use crate::Result;
use crate::report::PruneReport;
use std::path::Path;
use tracing::info;

/// Deletes every entry under `vendor` rejected by `deny`.
///
/// Running it again on an already pruned tree deletes nothing.
///
/// # Errors
///
/// Returns [`crate::PackError::Io`] if the tree cannot be read or a deletion
/// fails.
pub fn prune(vendor: &Path, deny: &DenyLists) -> Result<PruneReport> {
    let plan = plan_prune(vendor, deny)?;
    info!(
        vendor = %vendor.display(),
        planned = plan.len(),
        "pruning vendor tree"
    );
    plan.apply()
}
