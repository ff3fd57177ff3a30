//! Spreadsheet import of branches, assets and spare parts.

mod arabic;
mod importer;
mod matcher;
mod workbook;

pub use arabic::normalize;
pub use importer::{ImportKind, ImportReport, Importer, SkippedRow};
pub use matcher::BranchMatcher;
pub use workbook::{read_bytes, read_path, Rows};
