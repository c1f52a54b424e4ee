use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::model::{AuthorRow, column_labels};

/// Makes one field safe for the line-oriented CSV output: embedded line
/// feeds become single spaces. Quote doubling is left to the writer.
#[must_use]
pub fn csv_safe_text(value: &str) -> String {
    value.replace('\n', " ")
}

/// Encodes rows as CSV: a bare header line, then one line per row with every
/// field quoted. Lines are joined with `\n` and there is no trailing newline.
pub fn encode_csv(rows: &[AuthorRow]) -> Result<String, ExportError> {
    let mut buffer = column_labels().join(",").into_bytes();
    if rows.is_empty() {
        return Ok(String::from_utf8(buffer)?);
    }
    buffer.push(b'\n');

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);
    for row in rows {
        writer.write_record(row.fields().map(csv_safe_text))?;
    }
    writer.flush()?;

    let mut bytes = writer
        .into_inner()
        .map_err(|error| ExportError::Csv(error.into_error().into()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8(bytes)?)
}
