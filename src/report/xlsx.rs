//! Spreadsheet export of a scan artifact.

use crate::error::ScanError;
use crate::models::{ScanArtifact, ScanRecord};
use rust_xlsxwriter::{Color, Format, Workbook};

/// MIME type of the exported workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One single-column sheet to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPlan<'a> {
    pub name: &'static str,
    pub header: &'static str,
    pub rows: &'a [String],
}

/// Decide which sheets an export contains.
///
/// The subdomain sheet is always present, even when empty. The email sheet
/// is only added when there is at least one email.
pub fn plan_sheets(artifact: &ScanArtifact) -> Vec<SheetPlan<'_>> {
    let mut sheets = vec![SheetPlan {
        name: "Subdomains",
        header: "Subdomain",
        rows: &artifact.subdomains,
    }];

    if !artifact.emails.is_empty() {
        sheets.push(SheetPlan {
            name: "Emails",
            header: "Email",
            rows: &artifact.emails,
        });
    }

    sheets
}

/// Render an artifact as an in-memory xlsx workbook.
pub fn export_xlsx(artifact: &ScanArtifact) -> Result<Vec<u8>, ScanError> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2563eb))
        .set_font_color(Color::White);

    for sheet in plan_sheets(artifact) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        worksheet.write_with_format(0, 0, sheet.header, &header_format)?;

        let mut row: u32 = 1;
        for value in sheet.rows {
            worksheet.write(row, 0, value.as_str())?;
            row += 1;
        }

        worksheet.set_column_width(0, 50)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Download file name for a stored scan: `scan_<id>_<domain>.xlsx`.
pub fn export_filename(record: &ScanRecord) -> String {
    format!("scan_{}_{}.xlsx", record.id, record.domain)
}
