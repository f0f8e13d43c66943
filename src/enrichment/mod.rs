//! AI-assisted enrichment of extracted fields
//!
//! The model is an opaque capability: it receives a prompt built from the
//! description text and answers in a fixed line-oriented format, which this
//! module parses. Enrichment is optional; [`Enrichment::Unavailable`] is a
//! normal state, and a failed call leaves the record as it was.

mod http;

pub use http::{ChatConfig, ChatEnricher};

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::config::EnrichmentConfig;
use crate::types::{ExtractedFields, Field, MAX_LIST_ITEMS};
use crate::util::lazy_regex;

/// Errors from the enrichment adapter. Never fatal to a page.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Enrichment is not configured")]
    Unavailable,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Empty response from model")]
    EmptyResponse,
}

/// Text-in, text-out model call
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, prompt: &str) -> Result<String, EnrichmentError>;
}

/// Optional enrichment capability
#[derive(Clone, Default)]
pub enum Enrichment {
    #[default]
    Unavailable,
    Available(Arc<dyn Enricher>),
}

impl std::fmt::Debug for Enrichment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => f.write_str("Enrichment::Unavailable"),
            Self::Available(_) => f.write_str("Enrichment::Available"),
        }
    }
}

impl Enrichment {
    /// Build from config; disabled or endpoint-less configs are `Unavailable`
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let Some(endpoint) = config.active_endpoint() else {
            return Ok(Self::Unavailable);
        };
        let enricher = ChatEnricher::new(ChatConfig {
            endpoint: endpoint.to_string(),
            api_key: config.resolve_api_key(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            max_input_chars: config.max_input_chars,
        })?;
        Ok(Self::Available(Arc::new(enricher)))
    }

    pub fn available(enricher: Arc<dyn Enricher>) -> Self {
        Self::Available(enricher)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Ask the model about a description and parse its answer
    pub async fn enhance(&self, description: &str) -> Result<EnrichmentResponse, EnrichmentError> {
        let Self::Available(enricher) = self else {
            return Err(EnrichmentError::Unavailable);
        };
        let raw = enricher.enrich(&build_prompt(description)).await?;
        if raw.trim().is_empty() {
            return Err(EnrichmentError::EmptyResponse);
        }
        Ok(EnrichmentResponse::parse(&raw))
    }
}

/// Prompt asking for the fixed response grammar
pub fn build_prompt(description: &str) -> String {
    format!(
        "Extract the following information from this job description:\n\
         1. Skills required (list up to {max})\n\
         2. Benefits offered (list up to {max})\n\
         3. Job category\n\
         4. Industry\n\
         5. Education requirements\n\
         6. Experience requirements\n\
         7. Job Type (full-time, part-time, contract, etc.)\n\
         \n\
         Return the results in exactly this format, one per line:\n\
         Skills: skill1, skill2, ...\n\
         Benefits: benefit1, benefit2, ...\n\
         Category: category\n\
         Industry: industry\n\
         Education: education requirement\n\
         Experience: experience requirement\n\
         Job Type: job type\n\
         \n\
         Here's the job description:\n{description}",
        max = MAX_LIST_ITEMS,
        description = description
    )
}

static RE_SKILLS: OnceLock<Regex> = OnceLock::new();
static RE_BENEFITS: OnceLock<Regex> = OnceLock::new();
static RE_CATEGORY: OnceLock<Regex> = OnceLock::new();
static RE_INDUSTRY: OnceLock<Regex> = OnceLock::new();
static RE_EDUCATION: OnceLock<Regex> = OnceLock::new();
static RE_EXPERIENCE: OnceLock<Regex> = OnceLock::new();
static RE_JOB_TYPE: OnceLock<Regex> = OnceLock::new();

/// Placeholder answers that mean "nothing found"
const EMPTY_ANSWERS: &[&str] = &["n/a", "na", "none", "not specified", "not mentioned", "-"];

fn line_value(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?.get(1)?.as_str().trim();
    let value = value.trim_matches(|c: char| c == '*' || c.is_whitespace());
    if value.is_empty() || EMPTY_ANSWERS.contains(&value.to_lowercase().as_str()) {
        None
    } else {
        Some(value.to_string())
    }
}

fn list_value(re: &Regex, text: &str) -> Option<Vec<String>> {
    let items: Vec<String> = line_value(re, text)?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_LIST_ITEMS)
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Parsed model answer; every line is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentResponse {
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub job_type: Option<String>,
}

impl EnrichmentResponse {
    pub fn parse(text: &str) -> Self {
        Self {
            skills: list_value(lazy_regex(&RE_SKILLS, r"Skills:[ \t]*([^\n]*)"), text),
            benefits: list_value(lazy_regex(&RE_BENEFITS, r"Benefits:[ \t]*([^\n]*)"), text),
            category: line_value(lazy_regex(&RE_CATEGORY, r"Category:[ \t]*([^\n]*)"), text),
            industry: line_value(lazy_regex(&RE_INDUSTRY, r"Industry:[ \t]*([^\n]*)"), text),
            education: line_value(lazy_regex(&RE_EDUCATION, r"Education:[ \t]*([^\n]*)"), text),
            experience: line_value(lazy_regex(&RE_EXPERIENCE, r"Experience:[ \t]*([^\n]*)"), text),
            job_type: line_value(lazy_regex(&RE_JOB_TYPE, r"Job Type:[ \t]*([^\n]*)"), text),
        }
    }

    /// Merge into extracted fields.
    ///
    /// Skills and benefits replace what was extracted; industry is always
    /// taken; category, education, experience and type only fill gaps.
    pub fn apply(self, fields: &mut ExtractedFields) {
        if let Some(skills) = self.skills {
            fields.skills = skills;
        }
        if let Some(benefits) = self.benefits {
            fields.benefits = benefits;
        }
        if let Some(industry) = self.industry {
            fields.set(Field::Industry, industry);
        }
        if let Some(category) = self.category {
            fields.set_if_missing(Field::Category, category);
        }
        if let Some(education) = self.education {
            fields.set_if_missing(Field::Education, education);
        }
        if let Some(experience) = self.experience {
            fields.set_if_missing(Field::Experience, experience);
        }
        if let Some(job_type) = self.job_type {
            fields.set_if_missing(Field::JobType, job_type);
        }
    }
}
