//! Field extraction from job-posting HTML
//!
//! Extraction is an ordered cascade of named strategies:
//! - Structured table scan (label/value rows)
//! - Field-specific CSS selector lists
//! - `<title>` fallback
//! - `<keyword>: value` patterns over the page text
//! - Job-type vocabulary scan
//!
//! Each stage fills only fields no earlier stage has set. A page without any
//! title is rejected with [`ExtractError::NoTitle`].

mod description;
mod patterns;
mod selectors;
mod table;
mod text;
mod types;

pub use description::{assemble_description, is_relevant, IRRELEVANT_MARKERS};
pub use patterns::{JobTypeVocabulary, KeywordPatterns};
pub use selectors::{split_page_title, SelectorCascade, TitleTag};
pub use table::{split_title_skills, StructuredTable};
pub use text::{document_text, element_text};
pub use types::*;

use scraper::Html;

use crate::config::DomainConfig;
use crate::types::{ExtractedFields, Field};

/// Runs the extraction cascade over a cleaned job page
pub struct FieldExtractor {
    pub(crate) config: ExtractorConfig,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl FieldExtractor {
    /// Create an extractor with the default cascade
    pub fn new(config: ExtractorConfig) -> Self {
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
        match StructuredTable::new() {
            Some(table) => strategies.push(Box::new(table)),
            None => tracing::warn!("Structured table scan disabled: selector compilation failed"),
        }
        strategies.push(Box::new(SelectorCascade::new()));
        strategies.push(Box::new(TitleTag::new()));
        strategies.push(Box::new(KeywordPatterns::new(config.max_capture_chars)));
        strategies.push(Box::new(JobTypeVocabulary));

        Self { config, strategies }
    }

    /// Create an extractor with a custom cascade
    pub fn with_strategies(config: ExtractorConfig, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { config, strategies }
    }

    /// Names of the cascade stages, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn run_cascade(&self, page: &PageContext<'_>) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        for strategy in &self.strategies {
            let partial = strategy.extract(page, &fields);
            if !partial.is_empty() {
                tracing::trace!(
                    strategy = strategy.name(),
                    fields = ?partial.present_fields(),
                    "Cascade stage filled fields"
                );
            }
            fields.fill_missing(partial);
        }
        fields
    }

    /// Extract job fields from cleaned HTML
    pub fn extract(&self, html: &str, domain: Option<&DomainConfig>) -> Result<ExtractedFields, ExtractError> {
        self.extract_all(html, domain).map(|page| page.fields)
    }

    /// Extract job fields and the description text from one parse of the page
    pub fn extract_all(&self, html: &str, domain: Option<&DomainConfig>) -> Result<PageExtraction, ExtractError> {
        let document = Html::parse_document(html);
        let page = PageContext::new(&document, domain);

        let fields = self.run_cascade(&page);
        if !fields.has(Field::Title) {
            return Err(ExtractError::NoTitle);
        }

        let description = assemble_description(&page, &self.config);
        Ok(PageExtraction { fields, description })
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}
