//! Strip navigation and script noise from raw HTML
//!
//! Best-effort only: a little noise may survive and a little content may be
//! dropped. The output is re-serialized markup for the field extractor.

use scraper::{ElementRef, Html, Selector};

/// Elements removed outright
const NOISE_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header", "noscript"];

/// Class/id markers of navigation chrome
pub const NOISE_MARKERS: &[&str] = &["nav", "menu", "navigation", "footer", "header", "sidebar"];

/// Never removed, whatever their attributes say
const PROTECTED_ELEMENTS: &[&str] = &["html", "head", "body", "title"];

/// Content classes of known boards whose names happen to contain a marker
const CONTENT_CLASSES: &[&str] = &[
    "jobsearch-jobinfoheader-title",
    "jobsearch-jobinfoheader-title-container",
    "jobsearch-jobinfoheader-subtitle",
];

/// Whether a class or id attribute value contains one of `markers`.
///
/// Matching is a case-insensitive substring test, so `topnav` and
/// `siteheader` match. Names listed in [`CONTENT_CLASSES`] never match.
pub fn attr_has_marker(value: &str, markers: &[&str]) -> bool {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|name| !CONTENT_CLASSES.contains(&name.as_str()))
        .any(|name| markers.iter().any(|m| name.contains(m)))
}

/// Whether an element's class or id carries one of `markers`
pub fn element_has_marker(element: &ElementRef<'_>, markers: &[&str]) -> bool {
    let value = element.value();
    value
        .attr("class")
        .map(|c| attr_has_marker(c, markers))
        .unwrap_or(false)
        || value
            .id()
            .map(|id| attr_has_marker(id, markers))
            .unwrap_or(false)
}

fn is_noise(element: &ElementRef<'_>) -> bool {
    let name = element.value().name();
    if PROTECTED_ELEMENTS.contains(&name) {
        return false;
    }
    NOISE_ELEMENTS.contains(&name) || element_has_marker(element, NOISE_MARKERS)
}

/// Remove noise elements and re-serialize
pub fn clean_html(html: &str) -> String {
    let mut document = Html::parse_document(html);

    let all = match Selector::parse("*") {
        Ok(s) => s,
        Err(_) => return html.to_string(),
    };

    let noise: Vec<_> = document
        .select(&all)
        .filter(is_noise)
        .map(|element| element.id())
        .collect();

    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document.html()
}
