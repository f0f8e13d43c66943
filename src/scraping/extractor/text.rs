//! Text extraction helpers

use scraper::{ElementRef, Html};

use crate::util::collapse_whitespace;

/// Text nodes of an element joined by spaces, whitespace collapsed.
/// Text inside `<script>`, `<style>` and `<noscript>` is skipped.
pub fn element_text(element: &ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_code = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .map(|name| matches!(name, "script" | "style" | "noscript"))
            .unwrap_or(false);
        if !in_code {
            parts.push(&**text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

/// Text of the whole document
pub fn document_text(document: &Html) -> String {
    element_text(&document.root_element())
}
