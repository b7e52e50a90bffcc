//! # Widget Catalog
//!
//! Static, ordered list of the widgets offered in the builder palette.
//! Each widget is a template: dropping it on the canvas stamps out a new
//! element carrying copies of the widget's default content and styles.

use crate::element::{ElementKind, FieldMap, PageElement};
use crate::schema::all_schemas;
use std::sync::OnceLock;

/// Palette entry used to create new elements
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub kind: ElementKind,
    pub label: &'static str,
    pub default_content: FieldMap,
    pub default_styles: FieldMap,
}

impl Widget {
    /// Build a fresh element from this template
    pub fn instantiate(&self, id: impl Into<String>) -> PageElement {
        PageElement {
            id: id.into(),
            kind: self.kind.clone(),
            content: self.default_content.clone(),
            styles: Some(self.default_styles.clone()),
            children: None,
        }
    }
}

/// Order in which widgets appear in the palette
const CATALOG_ORDER: &[&str] = &[
    "section", "hero", "text", "image", "button", "video", "card", "gallery", "quote", "container",
];

static CATALOG: OnceLock<Vec<Widget>> = OnceLock::new();

/// All palette widgets, fixed for the lifetime of the process
pub fn list_widgets() -> &'static [Widget] {
    CATALOG.get_or_init(|| {
        CATALOG_ORDER
            .iter()
            .filter_map(|tag| all_schemas().iter().find(|schema| schema.tag == *tag))
            .map(|schema| Widget {
                kind: schema.kind(),
                label: schema.label,
                default_content: schema.default_content(),
                default_styles: FieldMap::new(),
            })
            .collect()
    })
}

/// Widget for a kind tag, if the palette offers it
pub fn find_widget(tag: &str) -> Option<&'static Widget> {
    list_widgets().iter().find(|widget| widget.kind.as_str() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_order_is_stable() {
        let tags: Vec<_> = list_widgets().iter().map(|w| w.kind.as_str()).collect();
        assert_eq!(tags, CATALOG_ORDER.to_vec());
    }

    #[test]
    fn test_instantiate_copies_defaults() {
        let widget = find_widget("section").unwrap();
        let element = widget.instantiate("el-1");

        assert_eq!(element.id, "el-1");
        assert_eq!(element.kind, ElementKind::Section);
        assert_eq!(element.content.get("columns"), Some(&json!(1)));
        assert_eq!(element.styles, Some(FieldMap::new()));
        assert!(element.children.is_none());
    }

    #[test]
    fn test_instances_do_not_share_content() {
        let widget = find_widget("text").unwrap();
        let mut a = widget.instantiate("a");
        let b = widget.instantiate("b");
        a.content.insert("text".into(), json!("changed"));
        assert_eq!(b.text("text"), "Lorem ipsum dolor sit amet...");
        assert_eq!(widget.default_content.get("text"), Some(&json!("Lorem ipsum dolor sit amet...")));
    }

    #[test]
    fn test_unknown_widget_lookup() {
        assert!(find_widget("marquee").is_none());
    }
}
