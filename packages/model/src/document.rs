//! # Page Documents
//!
//! A page document is the unit of persistence: the whole element tree of one
//! page, keyed by slug and replaced wholesale on every save.

use crate::element::PageElement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Slug of the page the builder edits
pub const DEFAULT_SLUG: &str = "home";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub slug: String,
    pub title: String,
    pub content: Vec<PageElement>,
    pub updated_at: DateTime<Utc>,
}

impl PageDocument {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, content: Vec<PageElement>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            content,
            updated_at: Utc::now(),
        }
    }

    /// Total number of elements, nested ones included
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        for element in &self.content {
            element.walk(&mut |_| count += 1);
        }
        count
    }
}

/// Result of decoding stored content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedContent {
    pub elements: Vec<PageElement>,
    /// Stored content was not a sequence and was replaced by an empty tree
    pub malformed: bool,
    /// Entries that could not be read as elements at all
    pub skipped: usize,
}

/// Decode stored content leniently
///
/// Non-sequence content becomes an empty tree. Unknown element kinds are
/// kept (they render as a placeholder); only entries that are not element
/// records at all are skipped.
pub fn decode_elements(value: Value) -> DecodedContent {
    let entries = match value {
        Value::Array(entries) => entries,
        _ => {
            return DecodedContent {
                elements: Vec::new(),
                malformed: true,
                skipped: 0,
            }
        }
    };

    let mut decoded = DecodedContent::default();
    for entry in entries {
        match serde_json::from_value::<PageElement>(entry) {
            Ok(element) => decoded.elements.push(element),
            Err(_) => decoded.skipped += 1,
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use serde_json::json;

    #[test]
    fn test_decode_tolerates_unknown_kinds() {
        let decoded = decode_elements(json!([
            { "id": "a", "type": "text", "content": { "text": "hi" } },
            { "id": "b", "type": "carousel", "content": {} }
        ]));

        assert!(!decoded.malformed);
        assert_eq!(decoded.skipped, 0);
        assert_eq!(decoded.elements.len(), 2);
        assert_eq!(decoded.elements[1].kind, ElementKind::Unknown("carousel".into()));
    }

    #[test]
    fn test_decode_non_sequence_is_empty() {
        let decoded = decode_elements(json!({ "not": "a list" }));
        assert!(decoded.malformed);
        assert!(decoded.elements.is_empty());

        let decoded = decode_elements(Value::Null);
        assert!(decoded.malformed);
    }

    #[test]
    fn test_decode_skips_non_records() {
        let decoded = decode_elements(json!([42, { "id": "a", "type": "quote" }]));
        assert_eq!(decoded.skipped, 1);
        assert_eq!(decoded.elements.len(), 1);
    }

    #[test]
    fn test_document_json_uses_camel_case() {
        let doc = PageDocument::new("home", "Home", vec![]);
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value.get("slug"), Some(&json!("home")));
    }

    #[test]
    fn test_element_count_includes_children() {
        let doc = PageDocument::new(
            "home",
            "Home",
            vec![
                PageElement::new("s", ElementKind::Section)
                    .with_child(PageElement::new("t", ElementKind::Text)),
                PageElement::new("q", ElementKind::Quote),
            ],
        );
        assert_eq!(doc.element_count(), 3);
    }
}
