//! Core types for jobscout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of skills or benefits kept on a record
pub const MAX_LIST_ITEMS: usize = 14;

// ============================================================================
// Extracted fields
// ============================================================================

/// Free-text fields a job page can yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Company,
    Location,
    JobType,
    Category,
    Industry,
    Salary,
    Experience,
    Education,
    Deadline,
    Vacancy,
    Link,
}

impl Field {
    /// Every field, in the order records are reported
    pub const ALL: [Field; 12] = [
        Field::Title,
        Field::Company,
        Field::Location,
        Field::JobType,
        Field::Category,
        Field::Industry,
        Field::Salary,
        Field::Experience,
        Field::Education,
        Field::Deadline,
        Field::Vacancy,
        Field::Link,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Company => "company",
            Self::Location => "location",
            Self::JobType => "job_type",
            Self::Category => "category",
            Self::Industry => "industry",
            Self::Salary => "salary",
            Self::Experience => "experience",
            Self::Education => "education",
            Self::Deadline => "deadline",
            Self::Vacancy => "vacancy",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intermediate result of extracting one job page.
///
/// Every field is optional; absence is a normal outcome. Cascade stages
/// only fill fields that are still `None` (see [`ExtractedFields::fill_missing`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub deadline: Option<String>,
    pub vacancy: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl ExtractedFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn has(&self, field: Field) -> bool {
        self.slot(field).is_some()
    }

    pub fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Title => &self.title,
            Field::Company => &self.company,
            Field::Location => &self.location,
            Field::JobType => &self.job_type,
            Field::Category => &self.category,
            Field::Industry => &self.industry,
            Field::Salary => &self.salary,
            Field::Experience => &self.experience,
            Field::Education => &self.education,
            Field::Deadline => &self.deadline,
            Field::Vacancy => &self.vacancy,
            Field::Link => &self.link,
        }
    }

    pub fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Company => &mut self.company,
            Field::Location => &mut self.location,
            Field::JobType => &mut self.job_type,
            Field::Category => &mut self.category,
            Field::Industry => &mut self.industry,
            Field::Salary => &mut self.salary,
            Field::Experience => &mut self.experience,
            Field::Education => &mut self.education,
            Field::Deadline => &mut self.deadline,
            Field::Vacancy => &mut self.vacancy,
            Field::Link => &mut self.link,
        }
    }

    /// Set a field, ignoring blank values
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *self.slot_mut(field) = Some(trimmed.to_string());
        }
    }

    /// Set a field only if it is still absent
    pub fn set_if_missing(&mut self, field: Field, value: impl Into<String>) {
        if !self.has(field) {
            self.set(field, value);
        }
    }

    /// Merge `other` into `self`, filling only fields that are still absent.
    /// Lists are taken from `other` only when `self` has none.
    pub fn fill_missing(&mut self, mut other: ExtractedFields) {
        if self.skills.is_empty() {
            self.skills = std::mem::take(&mut other.skills);
        }
        if self.benefits.is_empty() {
            self.benefits = std::mem::take(&mut other.benefits);
        }

        for field in Field::ALL {
            if !self.has(field) {
                *self.slot_mut(field) = other.slot_mut(field).take();
            }
        }
    }

    /// Fields that carry a value
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| self.has(*f)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty() && self.skills.is_empty() && self.benefits.is_empty()
    }
}

// ============================================================================
// Persisted records
// ============================================================================

/// Canonical job posting, keyed by `link`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub vacancy_count: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub deadline: Option<String>,
    pub salary: Option<String>,
    pub link: String,
    pub posted_at: DateTime<Utc>,
    /// Owned by this record, at most [`MAX_LIST_ITEMS`]
    pub skills: Vec<String>,
    /// Owned by this record, at most [`MAX_LIST_ITEMS`]
    pub benefits: Vec<String>,
}

impl JobRecord {
    /// Build a record from cleaned fields. Returns `None` when the title or
    /// link is missing.
    pub fn from_fields(fields: &ExtractedFields, posted_at: DateTime<Utc>) -> Option<Self> {
        let title = fields.title.clone().filter(|t| !t.trim().is_empty())?;
        let link = fields.link.clone().filter(|l| !l.trim().is_empty())?;

        Some(Self {
            title,
            company: fields.company.clone(),
            category: fields.category.clone(),
            industry: fields.industry.clone(),
            vacancy_count: fields.vacancy.clone(),
            education: fields.education.clone(),
            experience: fields.experience.clone(),
            location: fields.location.clone(),
            job_type: fields.job_type.clone(),
            deadline: fields.deadline.clone(),
            salary: fields.salary.clone(),
            link,
            posted_at,
            skills: fields.skills.iter().take(MAX_LIST_ITEMS).cloned().collect(),
            benefits: fields.benefits.iter().take(MAX_LIST_ITEMS).cloned().collect(),
        })
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.company {
            Some(company) => write!(f, "{} at {}", self.title, company),
            None => f.write_str(&self.title),
        }
    }
}

/// Cached copy of a fetched job page, keyed by `url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHtmlRecord {
    pub url: String,
    pub html_content: String,
    pub fetched_at: DateTime<Utc>,
    pub last_processed_at: Option<DateTime<Utc>>,
    pub processing_succeeded: bool,
    pub source_domain: String,
}

impl RawHtmlRecord {
    pub fn new(url: &str, html: &str, fetched_at: DateTime<Utc>, source_domain: &str) -> Self {
        Self {
            url: url.to_string(),
            html_content: html.to_string(),
            fetched_at,
            last_processed_at: None,
            processing_succeeded: false,
            source_domain: source_domain.to_string(),
        }
    }
}
