//! Per-site crawl hints and query terms, loaded from CSV
//!
//! Rows are mapped to typed records once at load time. A malformed row fails
//! the whole load before any fetching starts.

use scraper::Selector;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Placeholder substituted with the query term in search templates
pub const SEARCH_TERM_PLACEHOLDER: &str = "{searchTerm}";

/// Errors loading the domain or term files. Fatal to a crawl run.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} line {line}: {reason}")]
    InvalidRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("{0} contains no usable rows")]
    Empty(PathBuf),
}

/// Crawl hints for one job board
#[derive(Debug, Clone, PartialEq)]
pub struct DomainConfig {
    /// Base URL; job links are resolved against it
    pub domain_link: Url,
    /// Search URL containing [`SEARCH_TERM_PLACEHOLDER`]
    pub search_link: String,
    /// CSS selector locating job links on a results page
    pub job_link_selector: String,
    /// Whether results continue on `&page=N`
    pub pagination: bool,
    /// CSS selectors for the description region
    pub description_selectors: Vec<String>,
}

impl DomainConfig {
    /// Build and validate a domain config
    pub fn new(
        domain_link: &str,
        search_link: &str,
        job_link_selector: &str,
        pagination: bool,
        description_selectors: &str,
    ) -> Result<Self, String> {
        let domain_link = Url::parse(domain_link.trim())
            .map_err(|e| format!("invalid domain link '{}': {}", domain_link, e))?;
        if !matches!(domain_link.scheme(), "http" | "https") {
            return Err(format!("domain link '{}' is not http(s)", domain_link));
        }

        let search_link = search_link.trim().to_string();
        if !search_link.contains(SEARCH_TERM_PLACEHOLDER) {
            return Err(format!(
                "search link '{}' has no {} placeholder",
                search_link, SEARCH_TERM_PLACEHOLDER
            ));
        }

        let job_link_selector = job_link_selector.trim().to_string();
        Selector::parse(&job_link_selector)
            .map_err(|e| format!("invalid job link selector '{}': {:?}", job_link_selector, e))?;

        let description_selectors = split_selectors(description_selectors);
        for selector in &description_selectors {
            Selector::parse(selector)
                .map_err(|e| format!("invalid description selector '{}': {:?}", selector, e))?;
        }

        Ok(Self {
            domain_link,
            search_link,
            job_link_selector,
            pagination,
            description_selectors,
        })
    }

    /// Key identifying this domain in logs and the raw HTML cache
    pub fn key(&self) -> &str {
        self.domain_link.as_str()
    }

    /// First results page for a query term (spaces become `+`)
    pub fn search_url(&self, term: &str) -> String {
        let encoded = term.trim().replace(' ', "+");
        self.search_link.replace(SEARCH_TERM_PLACEHOLDER, &encoded)
    }

    /// Results page `page` (1-based) for a query term
    pub fn page_url(&self, term: &str, page: u32) -> String {
        let first = self.search_url(term);
        if page <= 1 {
            return first;
        }
        let separator = if first.contains('?') { '&' } else { '?' };
        format!("{}{}page={}", first, separator, page)
    }
}

fn split_selectors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Raw CSV row. Legacy column names are accepted as aliases.
#[derive(Debug, Deserialize)]
struct DomainRow {
    domain_link: String,
    #[serde(alias = "domian_search_link", alias = "domain_search_link")]
    search_link: String,
    #[serde(alias = "domain_job_link_path_from_search")]
    job_link_selector: String,
    #[serde(alias = "domain_pagination", default)]
    pagination: String,
    #[serde(alias = "domain_job_description_tags", default)]
    description_selectors: String,
}

/// All configured domains, in file order
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: Vec<DomainConfig>,
}

impl DomainRegistry {
    pub fn new(domains: Vec<DomainConfig>) -> Self {
        Self { domains }
    }

    /// Load and validate the domain CSV
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    /// Parse domain rows from any reader; `path` is used for error messages
    pub fn from_reader<R: std::io::Read>(reader: R, path: &Path) -> Result<Self, ConfigLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut domains = Vec::new();
        for (idx, row) in csv_reader.deserialize::<DomainRow>().enumerate() {
            // Header is line 1
            let line = idx + 2;
            let row = row.map_err(|source| ConfigLoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

            let invalid = |reason: String| ConfigLoadError::InvalidRow {
                path: path.to_path_buf(),
                line,
                reason,
            };

            let pagination = parse_yes_no(&row.pagination)
                .ok_or_else(|| invalid(format!("pagination must be yes/no, got '{}'", row.pagination)))?;

            let domain = DomainConfig::new(
                &row.domain_link,
                &row.search_link,
                &row.job_link_selector,
                pagination,
                &row.description_selectors,
            )
            .map_err(invalid)?;

            domains.push(domain);
        }

        if domains.is_empty() {
            return Err(ConfigLoadError::Empty(path.to_path_buf()));
        }

        Ok(Self { domains })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainConfig> {
        self.domains.iter()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Find a domain by its base URL
    pub fn get(&self, domain_link: &str) -> Option<&DomainConfig> {
        let wanted = domain_link.trim_end_matches('/');
        self.domains
            .iter()
            .find(|d| d.key().trim_end_matches('/') == wanted)
    }

    /// Find the domain whose host matches a URL
    pub fn for_url(&self, url: &str) -> Option<&DomainConfig> {
        let host = Url::parse(url).ok()?.host_str()?.to_string();
        self.domains
            .iter()
            .find(|d| d.domain_link.host_str() == Some(host.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct TermRow {
    #[serde(alias = "term", alias = "query")]
    job_title: String,
}

/// Load the predefined query terms (`job_title` column)
pub fn load_terms(path: &Path) -> Result<Vec<String>, ConfigLoadError> {
    let file = std::fs::File::open(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut terms = Vec::new();
    for row in reader.deserialize::<TermRow>() {
        let row = row.map_err(|source| ConfigLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if !row.job_title.is_empty() {
            terms.push(row.job_title);
        }
    }

    if terms.is_empty() {
        return Err(ConfigLoadError::Empty(path.to_path_buf()));
    }
    Ok(terms)
}
