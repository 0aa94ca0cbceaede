use crate::classify::Category;
use crate::fingerprint::Fingerprint;
use crate::markup::Element;
use std::path::PathBuf;

/// First element seen with its fingerprint, cleaned and categorised
#[derive(Debug, Clone)]
pub struct AcceptedElement {
    pub fingerprint: Fingerprint,
    pub category: Category,
    pub source: PathBuf,
    pub element: Element,
}

impl AcceptedElement {
    pub fn new(fingerprint: Fingerprint, category: Category, source: PathBuf, element: Element) -> Self {
        Self {
            fingerprint,
            category,
            source,
            element,
        }
    }

    pub fn to_html(&self) -> String {
        self.element.to_html()
    }
}
