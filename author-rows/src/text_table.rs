//! Plain-text rendering of author rows for terminal output.

use crate::model::{AuthorRow, column_labels};

/// Renders rows as a pipe-separated table padded to the widest cell of each
/// column. Line feeds inside a cell collapse to spaces.
#[must_use]
pub fn render_text_table(rows: &[AuthorRow]) -> String {
    let header = column_labels().map(str::to_string);
    let body = rows
        .iter()
        .map(|row| row.fields().map(|value| value.replace(['\r', '\n'], " ")))
        .collect::<Vec<_>>();

    let mut widths = header.clone().map(|label| label.chars().count());
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let separator = widths.map(|width| "-".repeat(width));
    push_line(&mut out, &separator, &widths);
    for cells in &body {
        push_line(&mut out, cells, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let padded = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}
