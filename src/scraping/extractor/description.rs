//! Description-region assembly for the enrichment adapter

use scraper::{ElementRef, Selector};

use super::text::element_text;
use super::types::{ExtractorConfig, PageContext};
use crate::scraping::normalizer::element_has_marker;

/// Class/id markers of page chrome that never holds the description
pub const IRRELEVANT_MARKERS: &[&str] = &[
    "nav",
    "menu",
    "footer",
    "sidebar",
    "header",
    "copyright",
    "social",
];

/// Whether an element can contribute description text
pub fn is_relevant(element: &ElementRef<'_>, text: &str, config: &ExtractorConfig) -> bool {
    if element_has_marker(element, IRRELEVANT_MARKERS) {
        return false;
    }
    let len = text.chars().count();
    len >= config.min_element_chars && len <= config.max_element_chars
}

/// Concatenate the text of the domain's description elements.
///
/// Without description selectors the whole page text is used, but only when
/// it is longer than `min_page_text_chars`.
pub fn assemble_description(page: &PageContext<'_>, config: &ExtractorConfig) -> String {
    let selectors: &[String] = page
        .domain
        .map(|d| d.description_selectors.as_slice())
        .unwrap_or(&[]);

    if selectors.is_empty() {
        if page.text.chars().count() > config.min_page_text_chars {
            return page.text.clone();
        }
        return String::new();
    }

    let mut description = String::new();
    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("Skipping description selector '{}': {:?}", raw, e);
                continue;
            }
        };
        for element in page.document.select(&selector) {
            let text = element_text(&element);
            if is_relevant(&element, &text, config) {
                description.push_str(&text);
                description.push('\n');
            }
        }
    }
    description.trim_end().to_string()
}
