// Candidate component selection over a parsed document

use crate::markup::{Document, Element};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Class tokens that look like utility classes
static UTILITY_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\s)(bg-|text-|p-|m-|flex|grid|rounded|shadow|border|hover:|focus:)").unwrap()
});

/// Tag names that signal a component even without utility classes
pub const COMPONENT_TAGS: &[&str] = &["button", "card", "nav", "header", "footer", "form"];

/// Generic containers that count as a component when their class names one
const GENERIC_CONTAINERS: &[&str] = &["div", "section"];

/// A selected element and the file it came from
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub element: &'a Element,
    pub source: &'a Path,
}

pub fn has_utility_class(element: &Element) -> bool {
    element
        .class_value()
        .is_some_and(|class| !class.trim().is_empty() && UTILITY_CLASS.is_match(class))
}

fn matches_component(element: &Element, component: &str) -> bool {
    if element.tag == component {
        return true;
    }
    GENERIC_CONTAINERS.contains(&element.tag.as_str())
        && element
            .class_value()
            .is_some_and(|class| class.to_lowercase().contains(component))
}

/// Select candidate components from `document`.
///
/// Pass one takes every element with a utility class, in document order.
/// Pass two walks [`COMPONENT_TAGS`] in order and, for each, appends the
/// matching elements not already selected. The result keeps that pass order.
pub fn scan<'a>(document: &'a Document, source: &'a Path) -> Vec<Candidate<'a>> {
    let elements: Vec<&Element> = document.elements().collect();
    let mut selected = vec![false; elements.len()];
    let mut candidates = Vec::new();

    for (idx, &element) in elements.iter().enumerate() {
        if has_utility_class(element) {
            selected[idx] = true;
            candidates.push(Candidate { element, source });
        }
    }

    for component in COMPONENT_TAGS {
        for (idx, &element) in elements.iter().enumerate() {
            if selected[idx] || !matches_component(element, component) {
                continue;
            }
            selected[idx] = true;
            candidates.push(Candidate { element, source });
        }
    }

    candidates
}
