//! Self-executing PHP archive container.
//!
//! An archive is a PHP bootstrap stub followed by a binary manifest, the
//! concatenated file data and a signature trailer. [`PharWriter`] produces
//! archives and [`PharArchive`] parses them back for inspection.

pub mod format;
pub mod metadata;
pub mod reader;
pub mod stub;
pub mod writer;

pub use reader::PharArchive;
pub use reader::PharEntry;
pub use reader::PharSignature;
pub use stub::stub_for;
pub use writer::PharWriter;
pub use writer::StagedSizes;
pub use writer::WrittenArchive;
