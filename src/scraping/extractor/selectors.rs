//! CSS selector heuristics and the `<title>` fallback

use scraper::Selector;

use super::text::element_text;
use super::types::{ExtractionStrategy, PageContext};
use crate::types::{ExtractedFields, Field};

/// Per-field selectors tuned to common job-board markup, in priority order
const FIELD_SELECTORS: &[(Field, &[&str])] = &[
    (
        Field::Title,
        &[
            "h1.job-title",
            ".job-title",
            "[itemprop='title']",
            ".jobsearch-JobInfoHeader-title",
            "h1",
        ],
    ),
    (
        Field::Company,
        &[
            ".company-name",
            ".company",
            "[itemprop='hiringOrganization']",
            ".employer",
            ".job-company",
        ],
    ),
    (
        Field::Location,
        &[".location", ".job-location", "[itemprop='jobLocation']"],
    ),
    (
        Field::JobType,
        &[".job-type", ".employment-type", "[itemprop='employmentType']"],
    ),
];

/// First non-empty match of a field-specific selector list
pub struct SelectorCascade {
    selectors: Vec<(Field, Vec<Selector>)>,
}

impl SelectorCascade {
    pub fn new() -> Self {
        let selectors = FIELD_SELECTORS
            .iter()
            .map(|(field, list)| {
                let compiled = list
                    .iter()
                    .filter_map(|s| match Selector::parse(s) {
                        Ok(sel) => Some(sel),
                        Err(e) => {
                            tracing::warn!("Invalid {} selector '{}': {:?}", field, s, e);
                            None
                        }
                    })
                    .collect();
                (*field, compiled)
            })
            .collect();
        Self { selectors }
    }
}

impl Default for SelectorCascade {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for SelectorCascade {
    fn name(&self) -> &'static str {
        "selector_cascade"
    }

    fn extract(&self, page: &PageContext<'_>, found: &ExtractedFields) -> ExtractedFields {
        let mut out = ExtractedFields::default();
        for (field, selectors) in &self.selectors {
            if found.has(*field) {
                continue;
            }
            let hit = selectors.iter().find_map(|sel| {
                page.document
                    .select(sel)
                    .map(|el| element_text(&el))
                    .find(|text| !text.is_empty())
            });
            if let Some(text) = hit {
                out.set(*field, text);
            }
        }
        out
    }
}

/// Title (and company) from the `<title>` element
pub struct TitleTag {
    title: Option<Selector>,
}

impl TitleTag {
    pub fn new() -> Self {
        Self {
            title: Selector::parse("title").ok(),
        }
    }
}

impl Default for TitleTag {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a page title on `" | "`, then `" - "`
pub fn split_page_title(title: &str) -> (&str, Option<&str>) {
    let title = title.trim();
    match title
        .split_once(" | ")
        .or_else(|| title.split_once(" - "))
    {
        Some((left, right)) => {
            let right = right.trim();
            (left.trim(), (!right.is_empty()).then_some(right))
        }
        None => (title, None),
    }
}

impl ExtractionStrategy for TitleTag {
    fn name(&self) -> &'static str {
        "title_tag"
    }

    fn extract(&self, page: &PageContext<'_>, found: &ExtractedFields) -> ExtractedFields {
        let mut out = ExtractedFields::default();
        if found.has(Field::Title) {
            return out;
        }
        let Some(selector) = &self.title else {
            return out;
        };
        let Some(element) = page.document.select(selector).next() else {
            return out;
        };

        let text = element_text(&element);
        let (title, company) = split_page_title(&text);
        out.set(Field::Title, title);
        if let Some(company) = company {
            if !found.has(Field::Company) {
                out.set(Field::Company, company);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn run<S: ExtractionStrategy>(strategy: &S, html: &str, found: &ExtractedFields) -> ExtractedFields {
        let doc = Html::parse_document(html);
        let page = PageContext::new(&doc, None);
        strategy.extract(&page, found)
    }

    #[test]
    fn first_matching_selector_wins() {
        let html = r#"<h1>Generic heading</h1>
            <div class="job-title">Site Engineer</div>
            <span class="company">BuildCo</span>
            <span class="company-name">BuildCo Ltd</span>
            <p class="job-location">Rajshahi</p>"#;
        let fields = run(&SelectorCascade::new(), html, &ExtractedFields::default());
        assert_eq!(fields.title.as_deref(), Some("Site Engineer"));
        assert_eq!(fields.company.as_deref(), Some("BuildCo Ltd"));
        assert_eq!(fields.location.as_deref(), Some("Rajshahi"));
        assert_eq!(fields.job_type, None);
    }

    #[test]
    fn empty_matches_are_skipped() {
        let html = r#"<h1 class="job-title">  </h1><h1>Plumber</h1>"#;
        let fields = run(&SelectorCascade::new(), html, &ExtractedFields::default());
        assert_eq!(fields.title.as_deref(), Some("Plumber"));
    }

    #[test]
    fn found_fields_are_not_searched() {
        let mut found = ExtractedFields::default();
        found.set(Field::Title, "From table");
        let fields = run(&SelectorCascade::new(), "<h1>Other</h1>", &found);
        assert_eq!(fields.title, None);
    }

    #[test]
    fn title_tag_splits_on_pipe() {
        let html = "<html><head><title>Backend Developer | Acme Corp</title></head><body></body></html>";
        let fields = run(&TitleTag::new(), html, &ExtractedFields::default());
        assert_eq!(fields.title.as_deref(), Some("Backend Developer"));
        assert_eq!(fields.company.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn title_tag_keeps_existing_company() {
        let mut found = ExtractedFields::default();
        found.set(Field::Company, "Known Co");
        let html = "<title>Driver - Fleet Inc</title>";
        let fields = run(&TitleTag::new(), html, &found);
        assert_eq!(fields.title.as_deref(), Some("Driver"));
        assert_eq!(fields.company, None);
    }

    #[test]
    fn split_page_title_variants() {
        assert_eq!(split_page_title("A | B - C"), ("A", Some("B - C")));
        assert_eq!(split_page_title("A - B"), ("A", Some("B")));
        assert_eq!(split_page_title("Just a title"), ("Just a title", None));
    }
}
