mod csv_out;
mod error;
mod model;
mod normalize;
mod payload;
mod text_table;
mod workbook;

use std::fs;
use std::path::Path;

pub use csv_out::{csv_safe_text, encode_csv};
pub use error::{ExportError, PayloadError};
pub use model::{Author, AuthorRow, COLUMNS, Column, PaperEntry, Year, column_labels};
pub use normalize::flatten_authors;
pub use payload::{json_kind, parse_entries, validate_entries};
pub use rust_xlsxwriter::Workbook;
pub use text_table::render_text_table;
pub use workbook::{
    MAX_CELL_CHARS, SHEET_NAME, build_workbook, encode_workbook, workbook_safe_text,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub entry_count: usize,
    pub row_count: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionTargets<'a> {
    pub csv: Option<&'a Path>,
    pub xlsx: Option<&'a Path>,
}

/// Converts a saved `/process-pdf` response body into author rows.
pub fn rows_from_response_json(json: &str) -> Result<(Vec<AuthorRow>, ConversionReport), PayloadError> {
    let entries = parse_entries(json)?;
    let rows = flatten_authors(&entries);
    let report = ConversionReport {
        entry_count: entries.len(),
        row_count: rows.len(),
    };
    Ok((rows, report))
}

/// Reads a saved response from disk and writes the requested exports.
pub fn convert_response_file(
    input_json: &Path,
    targets: ConversionTargets<'_>,
) -> Result<ConversionReport, ExportError> {
    let json = fs::read_to_string(input_json)?;
    let (rows, report) = rows_from_response_json(&json)?;

    if let Some(path) = targets.csv {
        fs::write(path, encode_csv(&rows)?)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "wrote csv export");
    }
    if let Some(path) = targets.xlsx {
        fs::write(path, encode_workbook(&rows)?)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "wrote workbook export");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::rows_from_response_json;

    #[test]
    fn reports_entry_and_row_counts() {
        let (rows, report) = rows_from_response_json(
            r#"[{"title":"T","authors":[{"name":"A"},{"name":"B"}]},{"title":"solo"}]"#,
        )
        .expect("payload should convert");

        assert_eq!(rows.len(), 2);
        assert_eq!(report.entry_count, 2);
        assert_eq!(report.row_count, 2);
    }
}
