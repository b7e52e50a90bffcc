//! # Page Elements
//!
//! A page is an ordered sequence of typed elements. Container kinds
//! (sections and containers) own children, each tagged with the
//! `columnIndex` of the slot it occupies in its parent.
//!
//! `content` and `styles` are free-form JSON maps whose shape is decided by
//! the element kind (see [`crate::schema`]). Keeping them as maps rather than
//! per-kind structs is what lets documents with unknown kinds or extra fields
//! survive a load/save round trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// JSON object used for element content and styles
pub type FieldMap = Map<String, Value>;

/// Key in a child's content naming the parent column slot it occupies
pub const COLUMN_INDEX_KEY: &str = "columnIndex";

/// Element type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Section,
    Container,
    Hero,
    Text,
    Image,
    Button,
    Video,
    Card,
    Gallery,
    Quote,
    /// Any tag this build does not know; kept verbatim so it round-trips
    Unknown(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Section => "section",
            ElementKind::Container => "container",
            ElementKind::Hero => "hero",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Button => "button",
            ElementKind::Video => "video",
            ElementKind::Card => "card",
            ElementKind::Gallery => "gallery",
            ElementKind::Quote => "quote",
            ElementKind::Unknown(tag) => tag,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ElementKind::Unknown(_))
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        match tag {
            "section" => ElementKind::Section,
            "container" => ElementKind::Container,
            "hero" => ElementKind::Hero,
            "text" => ElementKind::Text,
            "image" => ElementKind::Image,
            "button" => ElementKind::Button,
            "video" => ElementKind::Video,
            "card" => ElementKind::Card,
            "gallery" => ElementKind::Gallery,
            "quote" => ElementKind::Quote,
            other => ElementKind::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        ElementKind::from(tag.as_str())
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One block instance in a page's content tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageElement {
    /// Unique across the whole tree, assigned once at creation
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ElementKind,

    #[serde(default)]
    pub content: FieldMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<FieldMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<PageElement>>,
}

impl PageElement {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            content: FieldMap::new(),
            styles: None,
            children: None,
        }
    }

    pub fn with_content(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.styles
            .get_or_insert_with(FieldMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: PageElement) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// String content field, empty when absent or not a string
    pub fn text(&self, key: &str) -> &str {
        self.content.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// String style field, if set
    pub fn style(&self, key: &str) -> Option<&str> {
        self.styles
            .as_ref()
            .and_then(|styles| styles.get(key))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Stored column count; missing or invalid values read as one column
    pub fn columns(&self) -> usize {
        self.content
            .get("columns")
            .and_then(value_as_index)
            .filter(|columns| *columns >= 1)
            .unwrap_or(1)
    }

    /// Column slot this element occupies inside its parent
    pub fn column_index(&self) -> Option<usize> {
        self.content.get(COLUMN_INDEX_KEY).and_then(value_as_index)
    }

    pub fn children(&self) -> &[PageElement] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Children occupying the given column slot, in document order
    pub fn children_in_column(&self, column: usize) -> impl Iterator<Item = &PageElement> {
        self.children()
            .iter()
            .filter(move |child| child.column_index() == Some(column))
    }

    /// Visit this element and every descendant, depth first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a PageElement)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Shallow-merge a patch: each present sub-map is merged key by key
    pub fn merge(&mut self, patch: &ElementPatch) {
        if let Some(content) = &patch.content {
            for (key, value) in content {
                self.content.insert(key.clone(), value.clone());
            }
        }
        if let Some(styles) = &patch.styles {
            let target = self.styles.get_or_insert_with(FieldMap::new);
            for (key, value) in styles {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Partial update for one element's content and/or styles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<FieldMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<FieldMap>,
}

impl ElementPatch {
    /// Single content field update
    pub fn content(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = FieldMap::new();
        map.insert(key.into(), value.into());
        Self {
            content: Some(map),
            styles: None,
        }
    }

    /// Single style field update
    pub fn style(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = FieldMap::new();
        map.insert(key.into(), value.into());
        Self {
            content: None,
            styles: Some(map),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.as_ref().map_or(true, FieldMap::is_empty)
            && self.styles.as_ref().map_or(true, FieldMap::is_empty)
    }
}

fn value_as_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trips_unknown_tags() {
        let kind: ElementKind = serde_json::from_value(json!("carousel")).unwrap();
        assert_eq!(kind, ElementKind::Unknown("carousel".to_string()));
        assert_eq!(serde_json::to_value(&kind).unwrap(), json!("carousel"));

        let known: ElementKind = serde_json::from_value(json!("quote")).unwrap();
        assert_eq!(known, ElementKind::Quote);
    }

    #[test]
    fn test_columns_defaults_to_one() {
        let section = PageElement::new("s", ElementKind::Section);
        assert_eq!(section.columns(), 1);

        let zero = PageElement::new("s", ElementKind::Section).with_content("columns", 0);
        assert_eq!(zero.columns(), 1);

        let three = PageElement::new("s", ElementKind::Section).with_content("columns", 3);
        assert_eq!(three.columns(), 3);

        let text = PageElement::new("s", ElementKind::Section).with_content("columns", "2");
        assert_eq!(text.columns(), 2);
    }

    #[test]
    fn test_merge_is_shallow_and_per_map() {
        let mut element = PageElement::new("a", ElementKind::Card)
            .with_content("title", "Old")
            .with_content("description", "Keep")
            .with_style("color", "#000");

        element.merge(&ElementPatch::content("title", "New"));
        assert_eq!(element.text("title"), "New");
        assert_eq!(element.text("description"), "Keep");
        assert_eq!(element.style("color"), Some("#000"));

        element.merge(&ElementPatch::style("padding", "2rem"));
        assert_eq!(element.style("color"), Some("#000"));
        assert_eq!(element.style("padding"), Some("2rem"));
    }

    #[test]
    fn test_merge_creates_styles_when_missing() {
        let mut element = PageElement::new("a", ElementKind::Text);
        assert!(element.styles.is_none());
        element.merge(&ElementPatch::style("textAlign", "center"));
        assert_eq!(element.style("textAlign"), Some("center"));
    }

    #[test]
    fn test_children_partitioned_by_column() {
        let section = PageElement::new("s", ElementKind::Section)
            .with_content("columns", 2)
            .with_child(PageElement::new("a", ElementKind::Text).with_content(COLUMN_INDEX_KEY, 0))
            .with_child(PageElement::new("b", ElementKind::Text).with_content(COLUMN_INDEX_KEY, 1))
            .with_child(PageElement::new("c", ElementKind::Text).with_content(COLUMN_INDEX_KEY, 0));

        let first: Vec<_> = section.children_in_column(0).map(|c| c.id.as_str()).collect();
        assert_eq!(first, vec!["a", "c"]);
        let second: Vec<_> = section.children_in_column(1).map(|c| c.id.as_str()).collect();
        assert_eq!(second, vec!["b"]);
    }

    #[test]
    fn test_walk_visits_descendants() {
        let tree = PageElement::new("root", ElementKind::Section)
            .with_child(PageElement::new("child", ElementKind::Container)
                .with_child(PageElement::new("grandchild", ElementKind::Text)));

        let mut seen = Vec::new();
        tree.walk(&mut |el| seen.push(el.id.clone()));
        assert_eq!(seen, vec!["root", "child", "grandchild"]);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ElementPatch::default().is_empty());
        assert!(!ElementPatch::content("x", 1).is_empty());
    }
}
