// Accepted elements grouped by category

use tailsift_scanner::{AcceptedElement, Category, Fingerprint};

#[derive(Debug, Clone)]
pub struct CategoryGroup {
    pub category: Category,
    pub elements: Vec<AcceptedElement>,
}

/// Category groups in first-accepted order; elements within a group in
/// acceptance order. Append-only.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    groups: Vec<CategoryGroup>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: AcceptedElement) {
        match self
            .groups
            .iter_mut()
            .find(|group| group.category == element.category)
        {
            Some(group) => group.elements.push(element),
            None => self.groups.push(CategoryGroup {
                category: element.category,
                elements: vec![element],
            }),
        }
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn get(&self, category: Category) -> Option<&CategoryGroup> {
        self.groups.iter().find(|group| group.category == category)
    }

    /// `(category, element count)` in catalog order
    pub fn counts(&self) -> Vec<(Category, usize)> {
        self.groups
            .iter()
            .map(|group| (group.category, group.elements.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = Fingerprint> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.elements.iter().map(|el| el.fingerprint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tailsift_scanner::Element;

    fn accepted(tag: &str, category: Category) -> AcceptedElement {
        let element = Element::new(tag);
        AcceptedElement::new(
            Fingerprint::of_element(&element),
            category,
            PathBuf::from("a.html"),
            element,
        )
    }

    #[test]
    fn test_groups_keep_first_accepted_order() {
        let mut catalog = Catalog::new();
        catalog.push(accepted("nav", Category::Navbars));
        catalog.push(accepted("button", Category::Buttons));
        catalog.push(accepted("ul", Category::Navbars));

        assert_eq!(
            catalog.counts(),
            vec![(Category::Navbars, 2), (Category::Buttons, 1)]
        );
        assert_eq!(catalog.len(), 3);

        let navbars = catalog.get(Category::Navbars).unwrap();
        assert_eq!(navbars.elements[0].element.tag, "nav");
        assert_eq!(navbars.elements[1].element.tag, "ul");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.get(Category::Other).is_none());
        assert_eq!(catalog.fingerprints().count(), 0);
    }
}
