//! Export of stored scans.

pub mod xlsx;

pub use xlsx::{export_filename, export_xlsx, XLSX_MIME};
