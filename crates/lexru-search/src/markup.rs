//! HTML helpers shared by the scrapers and the page fetcher.

use scraper::{ElementRef, Html, Node, Selector};

use crate::http::{ProviderError, collapse_whitespace};

/// Elements whose text is never visible.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript"];

pub(crate) fn selector(css: &str) -> Result<Selector, ProviderError> {
    Selector::parse(css).map_err(|e| ProviderError::Selector(format!("{css}: {e:?}")))
}

/// Text content of an element, whitespace-collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Visible text of a whole document as one whitespace-joined string.
pub fn visible_text(doc: &Html) -> String {
    let mut parts = Vec::new();
    collect_text(doc.root_element(), &mut parts);
    collapse_whitespace(&parts.join(" "))
}

fn collect_text<'a>(el: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push(&**text),
            Node::Element(e) if HIDDEN_ELEMENTS.contains(&e.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Trimmed `<title>` text, if the document has a non-empty one.
pub fn document_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    doc.select(&sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}
