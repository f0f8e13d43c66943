//! Keyword pattern fallback and job-type vocabulary scan

use regex::Regex;

use super::types::{ExtractionStrategy, PageContext};
use crate::scraping::cleaner::derive_job_types;
use crate::types::{ExtractedFields, Field};
use crate::util::truncate_chars;

/// Label keywords per field, first matching keyword wins
const FIELD_KEYWORDS: &[(Field, &[&str])] = &[
    (Field::Company, &["company", "organization", "employer"]),
    (Field::Location, &["location", "address", "place"]),
    (Field::JobType, &["job type", "employment type", "contract"]),
    (Field::Salary, &["salary", "compensation", "pay"]),
    (Field::Experience, &["experience", "years of exp"]),
    (Field::Education, &["education", "qualification", "degree"]),
    (Field::Deadline, &["deadline", "closing date", "apply by"]),
    (Field::Category, &["category", "job category"]),
    (Field::Vacancy, &["vacancy", "vacancies", "no. of positions"]),
];

/// `<keyword>: value` search over the lowercased page text
pub struct KeywordPatterns {
    patterns: Vec<(Field, Vec<Regex>)>,
    max_capture_chars: usize,
}

impl KeywordPatterns {
    pub fn new(max_capture_chars: usize) -> Self {
        let patterns = FIELD_KEYWORDS
            .iter()
            .map(|(field, keywords)| {
                let compiled = keywords
                    .iter()
                    .filter_map(|kw| {
                        let pattern = format!(r"{}\s*:?\s*([\w\s,\-./]+)", regex::escape(kw));
                        match Regex::new(&pattern) {
                            Ok(re) => Some(re),
                            Err(e) => {
                                tracing::warn!("Invalid keyword pattern '{}': {}", pattern, e);
                                None
                            }
                        }
                    })
                    .collect();
                (*field, compiled)
            })
            .collect();

        Self {
            patterns,
            max_capture_chars,
        }
    }

    fn search(&self, patterns: &[Regex], text: &str) -> Option<String> {
        patterns.iter().find_map(|re| {
            let capture = re.captures(text)?.get(1)?.as_str().trim();
            let capture = truncate_chars(capture, self.max_capture_chars).trim_end();
            (!capture.is_empty()).then(|| capture.to_string())
        })
    }
}

impl ExtractionStrategy for KeywordPatterns {
    fn name(&self) -> &'static str {
        "keyword_patterns"
    }

    fn extract(&self, page: &PageContext<'_>, found: &ExtractedFields) -> ExtractedFields {
        let mut out = ExtractedFields::default();
        for (field, patterns) in &self.patterns {
            if found.has(*field) {
                continue;
            }
            if let Some(value) = self.search(patterns, &page.lower_text) {
                out.set(*field, value);
            }
        }
        out
    }
}

/// Job type from vocabulary words anywhere on the page
pub struct JobTypeVocabulary;

impl ExtractionStrategy for JobTypeVocabulary {
    fn name(&self) -> &'static str {
        "job_type_vocabulary"
    }

    fn extract(&self, page: &PageContext<'_>, found: &ExtractedFields) -> ExtractedFields {
        let mut out = ExtractedFields::default();
        if !found.has(Field::JobType) {
            if let Some(types) = derive_job_types(&page.text) {
                out.set(Field::JobType, types);
            }
        }
        out
    }
}
