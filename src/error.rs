//! Error types for the scan service.

use thiserror::Error;

/// Failures that abort a request.
///
/// Tool-level failures never show up here; they are recorded in the
/// per-tool results instead.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Domain failed shape validation.
    #[error("Invalid domain: {0:?}")]
    InvalidInput(String),

    /// No scan with this identifier.
    #[error("Scan {0} not found")]
    NotFound(u64),

    /// Storage I/O failed.
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored scan could not be decoded.
    #[error("Stored scan is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Spreadsheet generation failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Scan admission is closed.
    #[error("Scanner is not accepting new scans")]
    Unavailable,
}

impl From<rust_xlsxwriter::XlsxError> for ScanError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ScanError::Export(err.to_string())
    }
}
