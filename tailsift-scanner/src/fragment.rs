// Raw markup extraction from markup files and dynamic pages

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// `<?php ... ?>` and `<?= ... ?>` blocks
static DYNAMIC_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\?php.*?\?>|<\?=.*?\?>").unwrap());

/// Literal arguments of `echo '...';` / `echo "...";`
static OUTPUT_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)echo\s+['"](.+?)['"];"#).unwrap());

/// How a fragment was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentOrigin {
    /// Markup file read as-is
    Markup,
    /// Dynamic page with code regions stripped
    StaticAnalysis,
    /// Captured stdout of executing a dynamic page
    Execution,
}

impl FragmentOrigin {
    pub fn verb(&self) -> &'static str {
        match self {
            FragmentOrigin::Markup => "reading",
            FragmentOrigin::StaticAnalysis => "analyzing",
            FragmentOrigin::Execution => "executing",
        }
    }
}

/// One raw markup document, scanned independently of any other fragment
#[derive(Debug, Clone)]
pub struct Fragment {
    pub origin: FragmentOrigin,
    pub markup: String,
}

impl Fragment {
    pub fn new(origin: FragmentOrigin, markup: String) -> Self {
        Self { origin, markup }
    }

    pub fn is_blank(&self) -> bool {
        self.markup.trim().is_empty()
    }
}

/// Lossy but total: invalid UTF-8 becomes U+FFFD.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub fn strip_dynamic_regions(content: &str) -> String {
    DYNAMIC_REGION.replace_all(content, "").into_owned()
}

/// Literal strings passed to `echo`, in source order
pub fn extract_output_literals(content: &str) -> Vec<&str> {
    OUTPUT_LITERAL
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Static extraction for a dynamic page: the markup left after stripping code
/// regions, a space, then every echoed literal joined by spaces.
pub fn static_markup(content: &str) -> String {
    let stripped = strip_dynamic_regions(content);
    let literals = extract_output_literals(content).join(" ");
    format!("{} {}", stripped, literals)
}

pub fn markup_fragment(bytes: &[u8]) -> Fragment {
    Fragment::new(FragmentOrigin::Markup, decode_lossy(bytes))
}

pub fn static_fragment(bytes: &[u8]) -> Fragment {
    Fragment::new(FragmentOrigin::StaticAnalysis, static_markup(&decode_lossy(bytes)))
}
