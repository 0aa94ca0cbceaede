//! Owned markup tree built from a parsed document.
//!
//! The scanner, fingerprinting and cleaning all work on this tree rather than
//! on the parser's arena, so a cleaned copy never aliases the parse result.

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::fmt::Write;
use std::sync::LazyLock;

/// Attributes kept on cleaned elements
pub const RETAINED_ATTRIBUTES: &[&str] = &["class", "id", "type", "placeholder", "href", "src", "alt"];

/// Text longer than this (after trimming) is truncated when cleaning
pub const MAX_TEXT_CHARS: usize = 100;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Table-section tags are parsed under this prefix and renamed back after
/// conversion. Under their own names the tree builder drops rows found
/// outside a table and inserts an implied `<tbody>`.
const NEUTRAL_PREFIX: &str = "x-tailsift-";

static TABLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)(table|caption|colgroup|thead|tbody|tfoot|tr|td|th)\b").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
    Comment(String),
}

impl MarkupNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Raw value of the `class` attribute
    pub fn class_value(&self) -> Option<&str> {
        self.attr("class")
    }

    /// Class tokens in attribute order
    pub fn classes(&self) -> Vec<&str> {
        self.class_value()
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Class tokens joined by single spaces, lower-cased
    pub fn class_text(&self) -> String {
        self.classes().join(" ").to_lowercase()
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(MarkupNode::as_element)
    }

    /// All elements below this one in document order, excluding itself
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Whether any descendant (not this element) has one of `tags`
    pub fn contains_any(&self, tags: &[&str]) -> bool {
        self.descendants().any(|el| tags.contains(&el.tag.as_str()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.contains_any(&[tag])
    }

    pub fn count_descendants(&self, tag: &str) -> usize {
        self.descendants().filter(|el| el.tag == tag).count()
    }

    /// Copy of this subtree with comments dropped, script/style text cleared,
    /// non-retained attributes removed and long text truncated.
    pub fn cleaned(&self) -> Element {
        let raw_text = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());

        let attributes = self
            .attributes
            .iter()
            .filter(|(name, _)| RETAINED_ATTRIBUTES.contains(&name.as_str()))
            .cloned()
            .collect();

        let children = self
            .children
            .iter()
            .filter_map(|child| match child {
                MarkupNode::Comment(_) => None,
                MarkupNode::Text(_) if raw_text => None,
                MarkupNode::Text(text) => Some(MarkupNode::Text(truncate_text(text))),
                MarkupNode::Element(element) => Some(MarkupNode::Element(element.cleaned())),
            })
            .collect();

        Element {
            tag: self.tag.clone(),
            attributes,
            children,
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
        }

        if VOID_ELEMENTS.contains(&self.tag.as_str()) && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let raw_text = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        for child in &self.children {
            match child {
                MarkupNode::Element(element) => element.write_html(out),
                MarkupNode::Text(text) if raw_text => out.push_str(text),
                MarkupNode::Text(text) => out.push_str(&escape_text(text)),
                MarkupNode::Comment(comment) => {
                    let _ = write!(out, "<!--{}-->", comment);
                }
            }
        }

        let _ = write!(out, "</{}>", self.tag);
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        let before = self.stack.len();
        self.stack.extend(next.child_elements());
        self.stack[before..].reverse();
        Some(next)
    }
}

/// A parsed markup document
#[derive(Debug, Clone, Default)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    /// Parse markup leniently. Malformed input still yields a tree, and
    /// table markup keeps the structure it was written with.
    pub fn parse(markup: &str) -> Self {
        let neutral = TABLE_TAG.replace_all(markup, format!("<${{1}}{}${{2}}", NEUTRAL_PREFIX));
        let html = Html::parse_document(&neutral);
        Self {
            root: Some(convert_element(html.root_element())),
        }
    }

    /// Every element in document order, root included
    pub fn elements(&self) -> Descendants<'_> {
        Descendants {
            stack: self.root.iter().collect(),
        }
    }
}

fn convert_element(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let attributes = value
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let mut children = Vec::new();
    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    children.push(MarkupNode::Element(convert_element(child_element)));
                }
            }
            Node::Text(text) => children.push(MarkupNode::Text(String::from(&**text))),
            Node::Comment(comment) => children.push(MarkupNode::Comment(String::from(&**comment))),
            _ => {}
        }
    }

    let name = value.name();
    Element {
        tag: name.strip_prefix(NEUTRAL_PREFIX).unwrap_or(name).to_string(),
        attributes,
        children,
    }
}

fn truncate_text(text: &str) -> String {
    if text.trim().chars().count() > MAX_TEXT_CHARS {
        let head: String = text.chars().take(MAX_TEXT_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
