//! Field extraction types

use scraper::Html;
use thiserror::Error;
use url::Url;

use crate::config::DomainConfig;
use crate::types::ExtractedFields;

use super::text::document_text;

/// Errors during field extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No title-like content anywhere on the page; the page is unusable
    #[error("No job title found")]
    NoTitle,
}

/// A parsed job page shared by every cascade stage
pub struct PageContext<'a> {
    /// Parsed (normalized) document
    pub document: &'a Html,
    /// Whitespace-collapsed text of the whole document
    pub text: String,
    /// Lowercased `text`, for keyword search
    pub lower_text: String,
    /// Crawl hints for the page's domain, when known
    pub domain: Option<&'a DomainConfig>,
}

impl<'a> PageContext<'a> {
    pub fn new(document: &'a Html, domain: Option<&'a DomainConfig>) -> Self {
        let text = document_text(document);
        let lower_text = text.to_lowercase();
        Self {
            document,
            text,
            lower_text,
            domain,
        }
    }

    /// Resolve an `href` against the domain base, if one is known
    pub fn resolve(&self, href: &str) -> String {
        let href = href.trim();
        self.domain
            .and_then(|d| d.domain_link.join(href).ok())
            .or_else(|| Url::parse(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| href.to_string())
    }
}

/// One named stage of the extraction cascade.
///
/// A stage sees the fields found by earlier stages and returns whatever it
/// can find; the extractor merges the result with fill-if-absent semantics,
/// so a stage never overrides an earlier one.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, page: &PageContext<'_>, found: &ExtractedFields) -> ExtractedFields;
}

/// Extracted fields plus the description text assembled for enrichment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub fields: ExtractedFields,
    pub description: String,
}

/// Tuning for the field extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Keyword captures are cut to this many characters
    pub max_capture_chars: usize,
    /// Full page text is used as the description only above this length
    pub min_page_text_chars: usize,
    /// Description elements shorter than this are ignored
    pub min_element_chars: usize,
    /// Description elements longer than this are ignored
    pub max_element_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_capture_chars: 255,
            min_page_text_chars: 100,
            min_element_chars: 10,
            max_element_chars: 10_000,
        }
    }
}
