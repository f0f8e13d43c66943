//! Structured table scan
//!
//! Many boards render a posting as a two-column table of label/value rows.

use scraper::{ElementRef, Selector};

use super::text::element_text;
use super::types::{ExtractionStrategy, PageContext};
use crate::types::{ExtractedFields, Field};

/// Row label keywords, checked in order; the first hit decides the field
const ROW_LABELS: &[(&[&str], RowKind)] = &[
    (&["deadline", "closing", "last date"], RowKind::Field(Field::Deadline)),
    (&["link", "apply"], RowKind::Link),
    (&["type"], RowKind::Field(Field::JobType)),
    (&["title", "position", "designation"], RowKind::Title),
    (&["location", "address"], RowKind::Field(Field::Location)),
    (&["company", "organization", "employer"], RowKind::Field(Field::Company)),
    (&["category"], RowKind::Field(Field::Category)),
    (&["salary"], RowKind::Field(Field::Salary)),
    (&["experience"], RowKind::Field(Field::Experience)),
    (&["education"], RowKind::Field(Field::Education)),
    (&["vacanc"], RowKind::Field(Field::Vacancy)),
];

#[derive(Debug, Clone, Copy)]
enum RowKind {
    Title,
    Link,
    Field(Field),
}

/// Reads label/value rows out of job tables
pub struct StructuredTable {
    tables: Selector,
    rows: Selector,
    cells: Selector,
    anchors: Selector,
}

impl StructuredTable {
    pub fn new() -> Option<Self> {
        Some(Self {
            tables: Selector::parse("table").ok()?,
            rows: Selector::parse("tr").ok()?,
            cells: Selector::parse("th, td").ok()?,
            anchors: Selector::parse("a[href]").ok()?,
        })
    }

    fn is_job_table(table: &ElementRef<'_>) -> bool {
        let html = table.html().to_lowercase();
        let mentions_job = ["job", "position", "title"].iter().any(|k| html.contains(k));
        let mentions_nav = ["menu", "navigation"].iter().any(|k| html.contains(k));
        mentions_job && !mentions_nav
    }

    fn classify(label: &str) -> Option<RowKind> {
        let label = label.to_lowercase();
        ROW_LABELS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| label.contains(k)))
            .map(|(_, kind)| *kind)
    }
}

/// Split `"Senior Engineer Skills: Go, SQL"` into title and skill list
pub fn split_title_skills(text: &str) -> (String, Vec<String>) {
    let lower = text.to_lowercase();
    match lower.find("skills:") {
        // `to_lowercase` can change byte lengths; only split on a boundary
        Some(idx) if text.is_char_boundary(idx) && text.is_char_boundary(idx + 7) => {
            let title = text[..idx].trim().to_string();
            let skills = text[idx + 7..]
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (title, skills)
        }
        _ => (text.trim().to_string(), Vec::new()),
    }
}

impl ExtractionStrategy for StructuredTable {
    fn name(&self) -> &'static str {
        "structured_table"
    }

    fn extract(&self, page: &PageContext<'_>, _found: &ExtractedFields) -> ExtractedFields {
        let mut out = ExtractedFields::default();

        for table in page.document.select(&self.tables) {
            if !Self::is_job_table(&table) {
                continue;
            }

            for row in table.select(&self.rows) {
                let cells: Vec<ElementRef<'_>> = row.select(&self.cells).collect();
                let [label, value] = cells.as_slice() else {
                    continue;
                };

                let Some(kind) = Self::classify(&element_text(label)) else {
                    continue;
                };

                match kind {
                    RowKind::Title => {
                        if out.title.is_some() {
                            continue;
                        }
                        let (title, skills) = split_title_skills(&element_text(value));
                        out.set(Field::Title, title);
                        if out.skills.is_empty() {
                            out.skills = skills;
                        }
                    }
                    RowKind::Link => {
                        if let Some(href) = value
                            .select(&self.anchors)
                            .next()
                            .and_then(|a| a.value().attr("href"))
                        {
                            out.set_if_missing(Field::Link, page.resolve(href));
                        }
                    }
                    RowKind::Field(field) => {
                        out.set_if_missing(field, element_text(value));
                    }
                }
            }
        }

        out
    }
}
