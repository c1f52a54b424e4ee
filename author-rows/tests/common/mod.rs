use author_rows::AuthorRow;

pub const RESPONSE_JSON: &str = r#"[
  {
    "title": "On \"Quoted\" Titles",
    "year": 2023,
    "journal": "Journal of Tests",
    "notes": "first line\nsecond line",
    "authors": [
      {"name": "Ada Lovelace", "affiliation": "Analytical Engines, Ltd.", "email": "ada@example.org", "website": null},
      {"name": "Charles Babbage"}
    ]
  },
  {"title": "No Authors Here", "year": "2020"},
  {"title": "Solo", "authors": [{"name": "Grace Hopper", "website": "https://navy.example"}]}
]"#;

pub fn tricky_rows() -> Vec<AuthorRow> {
    vec![
        AuthorRow {
            title: "Commas, \"quotes\" and\nbreaks".to_string(),
            year: "2024".to_string(),
            author: "O'Neil, \"Cathy\"".to_string(),
            affiliation: "Dept. of \"Math\"".to_string(),
            email: "cathy@example.org".to_string(),
            website: String::new(),
            journal: "Weapons of Math\nDestruction".to_string(),
            notes: "\"".to_string(),
        },
        AuthorRow::default(),
        AuthorRow {
            title: "Plain".to_string(),
            author: "Someone".to_string(),
            ..AuthorRow::default()
        },
    ]
}
