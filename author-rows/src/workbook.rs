use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook};

use crate::error::ExportError;
use crate::model::{AuthorRow, column_labels};

pub const SHEET_NAME: &str = "Authors";

/// Excel rejects cell strings longer than this many characters.
pub const MAX_CELL_CHARS: usize = 32_767;

#[must_use]
pub fn workbook_safe_text(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => &value[..cut],
        None => value,
    }
}

/// Builds the single-sheet author workbook. Row 0 holds the column labels.
///
/// Document properties use a fixed creation date so the saved bytes only
/// depend on the rows.
pub fn build_workbook(rows: &[AuthorRow]) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let properties = DocProperties::new()
        .set_creation_datetime(&ExcelDateTime::from_ymd(2000, 1, 1)?);
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, label) in (0u16..).zip(column_labels()) {
        worksheet.write_string(0, col, label)?;
    }

    for (row_index, row) in (1u32..).zip(rows) {
        for (col, value) in (0u16..).zip(row.fields()) {
            worksheet.write_string(row_index, col, workbook_safe_text(value))?;
        }
    }

    Ok(workbook)
}

pub fn encode_workbook(rows: &[AuthorRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(rows)?;
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::{MAX_CELL_CHARS, workbook_safe_text};

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(workbook_safe_text("Grace Hopper"), "Grace Hopper");
    }

    #[test]
    fn long_text_is_cut_on_a_char_boundary() {
        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let safe = workbook_safe_text(&long);
        assert_eq!(safe.chars().count(), MAX_CELL_CHARS);
    }
}
