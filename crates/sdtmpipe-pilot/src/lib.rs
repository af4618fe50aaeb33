//! sdtmpipe pilot - CDISC pilot dataset conversion
//!
//! This crate locates the public-domain pilot study transport files
//! published by PHUSE, parses them, and converts them to CSV.

pub mod convert;
pub mod source;
pub mod table;
pub mod xpt;

// Re-exports
pub use convert::{ConvertOutcome, PilotConverter, write_csv};
pub use source::{SourceConfig, SourceRevision};
pub use table::DomainTable;
pub use xpt::{XptDataset, XptError, read_xpt};
