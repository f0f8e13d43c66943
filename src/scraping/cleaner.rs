//! Normalization of extracted fields into canonical form
//!
//! Every rule is a pure per-field function. [`RecordCleaner::clean`] applies
//! the whole rule set until the record stops changing, so cleaning a cleaned
//! record is a no-op.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::{ExtractedFields, Field, MAX_LIST_ITEMS};
use crate::util::{collapse_whitespace, lazy_regex};

/// Upper bound on rule passes per record
const MAX_PASSES: usize = 16;

/// Long locations are cut down to their trailing segments
const LOCATION_MAX_CHARS: usize = 100;

/// Recognized employment types, in output order
pub const JOB_TYPE_VOCABULARY: &[(&str, &str)] = &[
    ("Full-Time", r"(?i)\bfull[\s-]?time\b"),
    ("Part-Time", r"(?i)\bpart[\s-]?time\b"),
    ("Contract", r"(?i)\bcontract(ual)?\b"),
    ("Temporary", r"(?i)\btemporary\b"),
    ("Internship", r"(?i)\binternship\b"),
    ("Freelance", r"(?i)\bfreelance\b"),
    ("Remote", r"(?i)\bremote\b"),
];

static RE_TAG: OnceLock<Regex> = OnceLock::new();
static RE_TITLE_PREFIX: OnceLock<Regex> = OnceLock::new();
static RE_COMPANY_BADGE: OnceLock<Regex> = OnceLock::new();
static RE_COMPANY_TRAILER: OnceLock<Regex> = OnceLock::new();
static RE_COMPANY_URL: OnceLock<Regex> = OnceLock::new();
static RE_TRAILING_PUNCT: OnceLock<Regex> = OnceLock::new();
static RE_LOCATION_PREFIX: OnceLock<Regex> = OnceLock::new();
static RE_LOCATION_SUFFIX: OnceLock<Regex> = OnceLock::new();
static RE_TYPE_PREFIX: OnceLock<Regex> = OnceLock::new();
static RE_JOB_TYPES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn job_type_patterns() -> &'static [(&'static str, Regex)] {
    RE_JOB_TYPES.get_or_init(|| {
        JOB_TYPE_VOCABULARY
            .iter()
            .filter_map(|(name, pattern)| match Regex::new(pattern) {
                Ok(re) => Some((*name, re)),
                Err(e) => {
                    tracing::warn!("Invalid job type pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect()
    })
}

/// Every vocabulary job type mentioned in `text`, joined by `", "`
pub fn derive_job_types(text: &str) -> Option<String> {
    let found: Vec<&str> = job_type_patterns()
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
        .collect();

    if found.is_empty() {
        None
    } else {
        Some(found.join(", "))
    }
}

/// Replace markup with spaces; whitespace is left as is
pub fn strip_tags(text: &str) -> String {
    lazy_regex(&RE_TAG, r"<[^>]*>")
        .replace_all(text, " ")
        .into_owned()
}

/// Strip tags and collapse whitespace; empty becomes `None`
pub fn clean_text(text: &str) -> Option<String> {
    non_empty(collapse_whitespace(&strip_tags(text)))
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Remove a prefix pattern as many times as it matches
fn strip_repeated(re: &Regex, text: &str) -> String {
    let mut current = text.trim().to_string();
    while let Some(m) = re.find(&current) {
        if m.start() != 0 || m.is_empty() {
            break;
        }
        current = current[m.end()..].trim_start().to_string();
    }
    current
}

pub fn clean_title(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let re = lazy_regex(&RE_TITLE_PREFIX, r"(?i)^(job\s*title|job|title)\s*:\s*");
    non_empty(strip_repeated(re, &text))
}

pub fn clean_company(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let badge = lazy_regex(&RE_COMPANY_BADGE, r"(?i)\bverified\b.{0,40}?\bemployer\b");
    let trailer = lazy_regex(
        &RE_COMPANY_TRAILER,
        r"(?i)\s*\b(address|website|web\s*site|industry(\s*type)?|business(\s*type)?|company\s*info(rmation)?)\s*:.*$",
    );
    let url = lazy_regex(&RE_COMPANY_URL, r"(?i)\s*(https?://|www\.)\S*.*$");
    let punct = lazy_regex(&RE_TRAILING_PUNCT, r"[\s,;:|\-]+$");

    let text = badge.replace_all(&text, " ");
    let text = trailer.replace(&text, "");
    let text = url.replace(&text, "");
    let text = punct.replace(&text, "");
    clean_text(&text)
}

pub fn clean_location(raw: &str) -> Option<String> {
    let prefix = lazy_regex(&RE_LOCATION_PREFIX, r"(?i)^(location|office\s+address)\b\s*:?\s*");
    let suffix = lazy_regex(&RE_LOCATION_SUFFIX, r"(?i)\s*\boffice\s*8.*$");

    // Newlines still delimit segments at this point
    let stripped = strip_tags(raw);
    let stripped = strip_repeated(prefix, &stripped);
    let stripped = suffix.replace(&stripped, "").into_owned();

    let collapsed = collapse_whitespace(&stripped);
    if collapsed.chars().count() <= LOCATION_MAX_CHARS {
        return non_empty(collapsed);
    }

    let segments: Vec<String> = stripped
        .split(|c: char| c == ',' || c == '\n')
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect();
    let tail = &segments[segments.len().saturating_sub(2)..];
    non_empty(tail.join(", "))
}

pub fn clean_job_type(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let prefix = lazy_regex(&RE_TYPE_PREFIX, r"(?i)^job\s*type\b\s*:?\s*");
    let text = strip_repeated(prefix, &text);

    let lower = text.to_lowercase();
    if lower.contains("refine search") || lower.contains("results displaying") {
        return None;
    }
    derive_job_types(&text)
}

pub fn clean_category(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let lower = text.to_lowercase();
    if ["guide", "start hiring", "partnership"]
        .iter()
        .any(|noise| lower.contains(noise))
    {
        return None;
    }
    Some(text)
}

pub fn clean_salary(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let lower = text.to_lowercase();
    if lower.contains("png") || lower.contains("report this company") {
        return None;
    }
    Some(text)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| clean_text(item))
        .take(MAX_LIST_ITEMS)
        .collect()
}

fn clean_field(field: Field, raw: &str) -> Option<String> {
    match field {
        Field::Title => clean_title(raw),
        Field::Company => clean_company(raw),
        Field::Location => clean_location(raw),
        Field::JobType => clean_job_type(raw),
        Field::Category => clean_category(raw),
        Field::Salary => clean_salary(raw),
        _ => clean_text(raw),
    }
}

fn clean_once(fields: &ExtractedFields) -> ExtractedFields {
    let mut cleaned = ExtractedFields {
        skills: clean_list(&fields.skills),
        benefits: clean_list(&fields.benefits),
        ..ExtractedFields::default()
    };
    for field in Field::ALL {
        *cleaned.slot_mut(field) = fields.get(field).and_then(|raw| clean_field(field, raw));
    }
    cleaned
}

/// Turns raw extracted fields into their canonical form
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCleaner;

impl RecordCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean every field; idempotent
    pub fn clean(&self, fields: ExtractedFields) -> ExtractedFields {
        let mut current = fields;
        for _ in 0..MAX_PASSES {
            let next = clean_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}
