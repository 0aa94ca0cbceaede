// Category assignment for accepted elements

use crate::markup::Element;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Buttons,
    Forms,
    Headers,
    Navbars,
    Tables,
    Cards,
    Containers,
    Grids,
    Inputs,
    Footers,
    Sections,
    Links,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Buttons => "buttons",
            Category::Forms => "forms",
            Category::Headers => "headers",
            Category::Navbars => "navbars",
            Category::Tables => "tables",
            Category::Cards => "cards",
            Category::Containers => "containers",
            Category::Grids => "grids",
            Category::Inputs => "inputs",
            Category::Footers => "footers",
            Category::Sections => "sections",
            Category::Links => "links",
            Category::Other => "other",
        }
    }

    /// Heading used in the text report
    pub fn display_name(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Title-cased name for console output
    pub fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn class_has_any(class_text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| class_text.contains(needle))
}

/// Assign `element` to exactly one category. Rules are checked in order and
/// the first match wins; "contains" rules look at descendants only.
pub fn classify(element: &Element) -> Category {
    let tag = element.tag.as_str();
    let class_text = element.class_text();

    if tag == "button" || class_has_any(&class_text, &["btn", "button"]) {
        Category::Buttons
    } else if tag == "form" || element.contains("form") {
        Category::Forms
    } else if tag == "header" || class_text.contains("header") || element.contains("h1") {
        Category::Headers
    } else if tag == "nav" || class_has_any(&class_text, &["nav", "navbar", "menu"]) {
        Category::Navbars
    } else if tag == "table" || element.contains("table") {
        Category::Tables
    } else if class_text.contains("card")
        || (tag == "div" && element.contains("img") && element.count_descendants("div") > 1)
    {
        Category::Cards
    } else if class_has_any(&class_text, &["container", "wrapper"]) {
        Category::Containers
    } else if class_has_any(&class_text, &["grid", "row", "flex"]) {
        Category::Grids
    } else if matches!(tag, "input" | "select" | "textarea")
        || element.contains_any(&["input", "select", "textarea"])
    {
        Category::Inputs
    } else if tag == "footer" || class_text.contains("footer") {
        Category::Footers
    } else if tag == "section" || class_text.contains("section") {
        Category::Sections
    } else if tag == "a" || element.contains("a") {
        Category::Links
    } else {
        Category::Other
    }
}
