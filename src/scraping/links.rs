//! Job-link discovery on search-result pages

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Substrings that mark a URL as not being a job posting
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    denylist: Vec<String>,
}

impl LinkFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let denylist = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { denylist }
    }

    /// Whether `url` matches a denylisted pattern
    pub fn is_denied(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.denylist.iter().any(|p| lower.contains(p.as_str()))
    }
}

/// Links found on one search-result page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPageLinks {
    /// Absolute job URLs to dispatch, deduplicated, in page order
    pub job_links: Vec<String>,
    /// Elements matched before filtering; zero ends pagination
    pub matched: usize,
    /// Links dropped by the denylist
    pub denied: usize,
    /// Whether the href-keyword fallback produced the matches
    pub used_fallback: bool,
}

fn href_of<'a>(element: &ElementRef<'a>, anchors: &Selector) -> Option<&'a str> {
    if let Some(href) = element.value().attr("href") {
        return Some(href);
    }
    element
        .select(anchors)
        .next()
        .and_then(|a| a.value().attr("href"))
}

fn is_job_like_href(href: &str) -> bool {
    let lower = href.to_lowercase();
    lower.contains("job") || lower.contains("career")
}

/// Extract job links from a search-result page.
///
/// Elements matched by `selector` contribute their own `href` or that of
/// their first descendant anchor. When nothing matches and `allow_fallback`
/// is set, any anchor whose `href` mentions "job" or "career" is used.
pub fn extract_job_links(
    html: &str,
    base: &Url,
    selector: &str,
    allow_fallback: bool,
    filter: &LinkFilter,
) -> SearchPageLinks {
    let document = Html::parse_document(html);

    let anchors = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return SearchPageLinks::default(),
    };

    let mut hrefs: Vec<&str> = match Selector::parse(selector) {
        Ok(sel) => document
            .select(&sel)
            .filter_map(|el| href_of(&el, &anchors))
            .collect(),
        Err(e) => {
            tracing::warn!("Invalid job link selector '{}': {:?}", selector, e);
            Vec::new()
        }
    };

    let mut used_fallback = false;
    if hrefs.is_empty() && allow_fallback {
        hrefs = document
            .select(&anchors)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| is_job_like_href(href))
            .collect();
        used_fallback = !hrefs.is_empty();
    }

    let mut seen = HashSet::new();
    let mut result = SearchPageLinks {
        matched: hrefs.len(),
        used_fallback,
        ..SearchPageLinks::default()
    };

    for href in hrefs {
        let Ok(url) = base.join(href.trim()) else {
            continue;
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            continue;
        }
        let url = url.to_string();
        if filter.is_denied(&url) {
            result.denied += 1;
            continue;
        }
        if seen.insert(url.clone()) {
            result.job_links.push(url);
        }
    }

    result
}
