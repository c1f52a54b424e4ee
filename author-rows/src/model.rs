use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub affiliation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: Option<String>,
}

/// Floats at or beyond this magnitude keep their exponent notation.
const INTEGRAL_FLOAT_LIMIT: f64 = 1e15;

/// Publication year as sent by the backend: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Year {
    Number(Number),
    Text(String),
}

impl Year {
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => {
                if let Some(value) = number.as_i64() {
                    return value.to_string();
                }
                if let Some(value) = number.as_u64() {
                    return value.to_string();
                }
                match number.as_f64() {
                    Some(value) if value.fract() == 0.0 && value.abs() < INTEGRAL_FLOAT_LIMIT => {
                        format!("{value:.0}")
                    }
                    _ => number.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaperEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<Year>,
    #[serde(default, deserialize_with = "lenient_authors")]
    pub authors: Option<Vec<Author>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub journal: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

impl PaperEntry {
    /// Decodes one array element. Anything that is not an object becomes an
    /// entry with every field absent.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        if value.is_object() {
            serde_json::from_value(value).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    #[must_use]
    pub fn author_count(&self) -> usize {
        self.authors.as_ref().map_or(0, Vec::len)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<Year>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => Some(Year::Number(number)),
        Value::String(text) => Some(Year::Text(text)),
        _ => None,
    })
}

fn lenient_authors<'de, D>(deserializer: D) -> Result<Option<Vec<Author>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| {
                    if item.is_object() {
                        serde_json::from_value(item).unwrap_or_default()
                    } else {
                        Author::default()
                    }
                })
                .collect(),
        ),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    Year,
    Author,
    Affiliation,
    Email,
    Website,
    Journal,
    Notes,
}

/// Export column order. Every encoding writes fields in this order.
pub const COLUMNS: [Column; 8] = [
    Column::Title,
    Column::Year,
    Column::Author,
    Column::Affiliation,
    Column::Email,
    Column::Website,
    Column::Journal,
    Column::Notes,
];

impl Column {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Year => "Year",
            Self::Author => "Author",
            Self::Affiliation => "Affiliation",
            Self::Email => "Email",
            Self::Website => "Website",
            Self::Journal => "Journal",
            Self::Notes => "Notes",
        }
    }
}

#[must_use]
pub fn column_labels() -> [&'static str; 8] {
    COLUMNS.map(Column::label)
}

/// One author of one paper, flattened for export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRow {
    pub title: String,
    pub year: String,
    pub author: String,
    pub affiliation: String,
    pub email: String,
    pub website: String,
    pub journal: String,
    pub notes: String,
}

impl AuthorRow {
    #[must_use]
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Title => &self.title,
            Column::Year => &self.year,
            Column::Author => &self.author,
            Column::Affiliation => &self.affiliation,
            Column::Email => &self.email,
            Column::Website => &self.website,
            Column::Journal => &self.journal,
            Column::Notes => &self.notes,
        }
    }

    #[must_use]
    pub fn fields(&self) -> [&str; 8] {
        COLUMNS.map(|column| self.field(column))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Author, PaperEntry, Year, column_labels};

    #[test]
    fn labels_follow_export_order() {
        assert_eq!(
            column_labels(),
            [
                "Title",
                "Year",
                "Author",
                "Affiliation",
                "Email",
                "Website",
                "Journal",
                "Notes"
            ]
        );
    }

    #[test]
    fn wrongly_typed_fields_decode_as_absent() {
        let entry = PaperEntry::from_value(json!({
            "title": 42,
            "year": true,
            "authors": {"name": "not a list"},
            "journal": ["x"],
            "notes": null,
        }));

        assert_eq!(entry, PaperEntry::default());
    }

    #[test]
    fn non_object_author_still_counts() {
        let entry = PaperEntry::from_value(json!({
            "authors": ["Ada Lovelace", {"name": "Grace Hopper", "email": 7}],
        }));

        assert_eq!(entry.author_count(), 2);
        let authors = entry.authors.expect("authors should decode");
        assert_eq!(authors[0], Author::default());
        assert_eq!(authors[1].name.as_deref(), Some("Grace Hopper"));
        assert_eq!(authors[1].email, None);
    }

    #[test]
    fn non_object_entry_is_empty() {
        assert_eq!(PaperEntry::from_value(json!(null)), PaperEntry::default());
        assert_eq!(PaperEntry::from_value(json!("paper")), PaperEntry::default());
    }

    #[test]
    fn numeric_years_render_as_decimal_text() {
        let integral = PaperEntry::from_value(json!({"year": 2021}));
        let float = PaperEntry::from_value(json!({"year": 2019.0}));
        let fractional = PaperEntry::from_value(json!({"year": 2019.5}));
        let text = PaperEntry::from_value(json!({"year": "in press"}));

        assert_eq!(integral.year.map(|year| year.to_text()).as_deref(), Some("2021"));
        assert_eq!(float.year.map(|year| year.to_text()).as_deref(), Some("2019"));
        assert_eq!(
            fractional.year.map(|year| year.to_text()).as_deref(),
            Some("2019.5")
        );
        assert_eq!(text.year, Some(Year::Text("in press".to_string())));
    }

    #[test]
    fn huge_float_years_keep_exponent_notation() {
        let huge = PaperEntry::from_value(json!({"year": 1e300}));
        let negative = PaperEntry::from_value(json!({"year": -2.5e20}));
        let below_limit = PaperEntry::from_value(json!({"year": 123_456_789_012_345.0}));

        assert_eq!(huge.year.map(|year| year.to_text()).as_deref(), Some("1e300"));
        assert_eq!(
            negative.year.map(|year| year.to_text()).as_deref(),
            Some("-2.5e20")
        );
        assert_eq!(
            below_limit.year.map(|year| year.to_text()).as_deref(),
            Some("123456789012345")
        );
    }
}
