use crate::model::{AuthorRow, PaperEntry};

/// Flattens paper entries into one row per (paper, author) pair.
///
/// Entry order and author order are preserved. Entries without authors
/// contribute no rows. Absent values become empty strings here and nowhere
/// earlier.
#[must_use]
pub fn flatten_authors(entries: &[PaperEntry]) -> Vec<AuthorRow> {
    let mut rows = Vec::with_capacity(entries.iter().map(PaperEntry::author_count).sum());

    for entry in entries {
        let Some(authors) = entry.authors.as_deref() else {
            continue;
        };

        let title = text_or_empty(entry.title.as_deref());
        let year = entry
            .year
            .as_ref()
            .map(crate::model::Year::to_text)
            .unwrap_or_default();
        let journal = text_or_empty(entry.journal.as_deref());
        let notes = text_or_empty(entry.notes.as_deref());

        for author in authors {
            rows.push(AuthorRow {
                title: title.clone(),
                year: year.clone(),
                author: text_or_empty(author.name.as_deref()),
                affiliation: text_or_empty(author.affiliation.as_deref()),
                email: text_or_empty(author.email.as_deref()),
                website: text_or_empty(author.website.as_deref()),
                journal: journal.clone(),
                notes: notes.clone(),
            });
        }
    }

    rows
}

fn text_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
