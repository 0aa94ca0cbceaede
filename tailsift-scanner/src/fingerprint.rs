// Structural fingerprints and the shared dedup index

use crate::markup::{Element, MarkupNode};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Tags whose direct child tag names are part of their identity
pub const CONTAINER_TAGS: &[&str] = &["div", "section", "form", "nav", "header", "footer", "table"];

/// Digest of an element's tag, sorted class set and, for containers, sorted
/// direct child tags. Text content and other attributes never contribute.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// `None` for text and comment nodes
    pub fn of(node: &MarkupNode) -> Option<Self> {
        node.as_element().map(Self::of_element)
    }

    pub fn of_element(element: &Element) -> Self {
        let digest = Sha256::digest(structure_key(element).as_bytes());
        Self(digest.into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

/// The string that gets hashed, e.g. `div:card p-4:div,img`
pub fn structure_key(element: &Element) -> String {
    let mut classes = element.classes();
    classes.sort_unstable();

    let mut key = format!("{}:{}", element.tag, classes.join(" "));

    if CONTAINER_TAGS.contains(&element.tag.as_str()) {
        let mut children: Vec<&str> = element.child_elements().map(|el| el.tag.as_str()).collect();
        children.sort_unstable();
        key.push(':');
        key.push_str(&children.join(","));
    }

    key
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First time this structure was seen
    Accepted,
    /// Structure already in the index
    Duplicate,
}

/// Set of seen fingerprints shared by every worker.
///
/// Only [`DedupIndex::check_and_insert`] mutates it; the set itself is never
/// handed out.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically test for `fingerprint` and insert it if absent.
    pub fn check_and_insert(&self, fingerprint: Fingerprint) -> Admission {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.insert(fingerprint) {
            Admission::Accepted
        } else {
            Admission::Duplicate
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Document;
    use std::sync::Arc;
    use std::thread;

    fn button(classes: &str, text: &str) -> Element {
        Element::new("button")
            .with_attribute("class", classes)
            .with_child(MarkupNode::Text(text.to_string()))
    }

    #[test]
    fn test_structure_key_sorts_classes() {
        assert_eq!(structure_key(&button("p-4 btn bg-blue-500", "Go")), "button:bg-blue-500 btn p-4");
    }

    #[test]
    fn test_structure_key_includes_container_children() {
        let card = Element::new("div")
            .with_attribute("class", "card p-4")
            .with_child(MarkupNode::Element(Element::new("img")))
            .with_child(MarkupNode::Element(Element::new("div")))
            .with_child(MarkupNode::Text("loose".to_string()));
        assert_eq!(structure_key(&card), "div:card p-4:div,img");
    }

    #[test]
    fn test_table_key_uses_written_children() {
        let document = Document::parse(r#"<table class="x"><tr><td>a</td></tr></table>"#);
        let table = document.elements().find(|el| el.tag == "table").unwrap();
        assert_eq!(structure_key(table), "table:x:tr");

        let sectioned = Document::parse(r#"<table class="x"><tbody><tr><td>a</td></tr></tbody></table>"#);
        let sectioned = sectioned.elements().find(|el| el.tag == "table").unwrap();
        assert_eq!(structure_key(sectioned), "table:x:tbody");
        assert_ne!(Fingerprint::of_element(table), Fingerprint::of_element(sectioned));
    }

    #[test]
    fn test_non_container_ignores_children() {
        let plain = Element::new("span").with_attribute("class", "a");
        let nested = plain
            .clone()
            .with_child(MarkupNode::Element(Element::new("b")));
        assert_eq!(Fingerprint::of_element(&plain), Fingerprint::of_element(&nested));
    }

    #[test]
    fn test_fingerprint_ignores_text_and_other_attributes() {
        let a = button("btn bg-blue-500", "Go");
        let b = button("bg-blue-500  btn", "Stop").with_attribute("onclick", "stop()");
        assert_eq!(Fingerprint::of_element(&a), Fingerprint::of_element(&b));
    }

    #[test]
    fn test_fingerprint_distinguishes_tags_and_classes() {
        let a = button("btn", "Go");
        let b = button("btn-lg", "Go");
        let mut c = button("btn", "Go");
        c.tag = "a".to_string();

        assert_ne!(Fingerprint::of_element(&a), Fingerprint::of_element(&b));
        assert_ne!(Fingerprint::of_element(&a), Fingerprint::of_element(&c));
    }

    #[test]
    fn test_fingerprint_skips_non_elements() {
        assert!(Fingerprint::of(&MarkupNode::Text("x".to_string())).is_none());
        assert!(Fingerprint::of(&MarkupNode::Comment("x".to_string())).is_none());
        assert!(Fingerprint::of(&MarkupNode::Element(Element::new("p"))).is_some());
    }

    #[test]
    fn test_hex_rendering() {
        let hex = Fingerprint::of_element(&Element::new("p")).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_check_and_insert() {
        let index = DedupIndex::new();
        let fp = Fingerprint::of_element(&button("btn", "Go"));

        assert_eq!(index.check_and_insert(fp), Admission::Accepted);
        assert_eq!(index.check_and_insert(fp), Admission::Duplicate);
        assert!(index.contains(&fp));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_concurrent_inserts_accept_exactly_once() {
        let index = Arc::new(DedupIndex::new());
        let fp = Fingerprint::of_element(&button("btn", "Go"));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let index = index.clone();
                thread::spawn(move || index.check_and_insert(fp))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|a| *a == Admission::Accepted)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(index.len(), 1);
    }
}
