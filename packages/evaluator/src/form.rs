//! Inspector and palette views.
//!
//! Both are generated from the schema table so new kinds only need a schema
//! entry. Inputs carry `data-group` and `data-field` so the host page can turn
//! each change into a single-field patch.

use crate::vdom::VNode;
use marble_model::{schema_for, FieldSpec, InputKind, PageElement, Widget, STYLE_FIELDS};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorTab {
    #[default]
    Content,
    Style,
}

impl InspectorTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectorTab::Content => "content",
            InspectorTab::Style => "style",
        }
    }
}

/// Which map a field edit is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    Content,
    Styles,
}

impl FieldGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Content => "content",
            FieldGroup::Styles => "styles",
        }
    }
}

/// Render the inspector for the current selection
pub fn render_inspector(selected: Option<&PageElement>, tab: InspectorTab) -> VNode {
    let panel = VNode::element("aside").with_class("pb-inspector");
    let Some(element) = selected else {
        return panel.with_child(
            VNode::element("div")
                .with_class("pb-inspector-empty")
                .with_child(VNode::text("Select an element to edit")),
        );
    };

    let label = schema_for(&element.kind)
        .map(|schema| schema.label.to_string())
        .unwrap_or_else(|| element.kind.to_string());
    let short_id: String = element.id.chars().take(8).collect();

    let header = VNode::element("header")
        .with_class("pb-inspector-header")
        .with_child(VNode::element("h3").with_child(VNode::text(label)))
        .with_child(
            VNode::element("span")
                .with_class("pb-inspector-id")
                .with_child(VNode::text(format!("ID: {}", short_id))),
        )
        .with_child(
            VNode::element("button")
                .with_attr("type", "button")
                .with_attr("data-action", "delete")
                .with_attr("data-element-id", element.id.as_str())
                .with_attr("title", "Delete Element")
                .with_child(VNode::text("Delete")),
        );

    let tabs = VNode::element("nav").with_class("pb-tabs").with_children(
        [InspectorTab::Content, InspectorTab::Style].into_iter().map(|t| {
            let button = VNode::element("button")
                .with_attr("type", "button")
                .with_attr("data-tab", t.as_str())
                .with_child(VNode::text(match t {
                    InspectorTab::Content => "Content",
                    InspectorTab::Style => "Style",
                }));
            if t == tab {
                button.with_class("is-active")
            } else {
                button
            }
        }),
    );

    let body = match tab {
        InspectorTab::Content => content_fields(element),
        InspectorTab::Style => VNode::element("div").with_class("pb-fields").with_children(
            STYLE_FIELDS
                .iter()
                .map(|field| render_field(element, field, FieldGroup::Styles)),
        ),
    };

    panel
        .with_attr("data-element-id", element.id.as_str())
        .with_child(header)
        .with_child(tabs)
        .with_child(body)
}

fn content_fields(element: &PageElement) -> VNode {
    let fields = schema_for(&element.kind).map(|s| s.fields).unwrap_or(&[]);
    let body = VNode::element("div").with_class("pb-fields");
    if fields.is_empty() {
        return body.with_child(
            VNode::element("p")
                .with_class("pb-muted")
                .with_child(VNode::text("No content settings for this element.")),
        );
    }
    body.with_children(
        fields
            .iter()
            .map(|field| render_field(element, field, FieldGroup::Content)),
    )
}

fn current_value(element: &PageElement, field: &FieldSpec, group: FieldGroup) -> String {
    let value = match group {
        FieldGroup::Content => element.content.get(field.key),
        FieldGroup::Styles => element.styles.as_ref().and_then(|s| s.get(field.key)),
    };
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => field.display_default(),
        Some(other) => other.to_string(),
    }
}

fn input(field: &FieldSpec, group: FieldGroup, input_type: &str, value: &str) -> VNode {
    VNode::element("input")
        .with_attr("type", input_type)
        .with_attr("data-group", group.as_str())
        .with_attr("data-field", field.key)
        .with_attr("value", value)
        .with_attr("placeholder", field.placeholder)
}

fn textarea(field: &FieldSpec, group: FieldGroup, value: &str, rows: u32) -> VNode {
    VNode::element("textarea")
        .with_attr("data-group", group.as_str())
        .with_attr("data-field", field.key)
        .with_attr("rows", rows.to_string())
        .with_child(VNode::text(value))
}

/// One labelled form control
pub fn render_field(element: &PageElement, field: &FieldSpec, group: FieldGroup) -> VNode {
    let value = current_value(element, field, group);
    let control = match field.input {
        InputKind::Line => input(field, group, "text", &value),
        InputKind::Url => input(field, group, "url", &value),
        InputKind::Paragraph => textarea(field, group, &value, 3),
        InputKind::Markup => VNode::element("div")
            .with_child(textarea(field, group, &value, 8).with_class("pb-code"))
            .with_child(
                VNode::element("p")
                    .with_class("pb-hint")
                    .with_child(VNode::text("Raw HTML is supported.")),
            ),
        InputKind::Slider { min, max } => {
            let shown = value
                .parse::<i64>()
                .unwrap_or(min)
                .clamp(min, max);
            VNode::element("div")
                .with_class("pb-slider")
                .with_child(
                    input(field, group, "range", &shown.to_string())
                        .with_attr("min", min.to_string())
                        .with_attr("max", max.to_string())
                        .with_attr("step", "1"),
                )
                .with_child(VNode::element("span").with_child(VNode::text(shown.to_string())))
        }
        InputKind::Image => {
            let mut block = VNode::element("div")
                .with_class("pb-image-field")
                .with_child(
                    VNode::element("label")
                        .with_class("pb-dropzone")
                        .with_attr("data-upload-field", field.key)
                        .with_child(VNode::text("Click or drop an image to upload"))
                        .with_child(
                            VNode::element("input")
                                .with_attr("type", "file")
                                .with_attr("accept", "image/*")
                                .with_attr("data-upload-field", field.key),
                        ),
                );
            if !value.is_empty() {
                block = block.with_child(
                    VNode::element("img")
                        .with_class("pb-preview")
                        .with_attr("src", value.as_str())
                        .with_attr("alt", "Preview"),
                );
            }
            block.with_child(input(field, group, "text", &value))
        }
        InputKind::Color => VNode::element("div")
            .with_class("pb-color")
            .with_child(input(field, group, "color", if value.is_empty() { field.placeholder } else { value.as_str() }))
            .with_child(input(field, group, "text", &value)),
        InputKind::Select(options) => VNode::element("select")
            .with_attr("data-group", group.as_str())
            .with_attr("data-field", field.key)
            .with_children(options.iter().map(|(option, label)| {
                let node = VNode::element("option")
                    .with_attr("value", *option)
                    .with_child(VNode::text(*label));
                if *option == value {
                    node.with_attr("selected", "selected")
                } else {
                    node
                }
            })),
    };

    VNode::element("div")
        .with_class("pb-field")
        .with_child(VNode::element("label").with_child(VNode::text(field.label)))
        .with_child(control)
}

/// Widget palette; each entry is a drag source keyed by kind tag
pub fn render_palette(widgets: &[Widget]) -> VNode {
    VNode::element("nav")
        .with_class("pb-palette")
        .with_child(VNode::element("h3").with_child(VNode::text("Widgets")))
        .with_children(widgets.iter().map(|widget| {
            VNode::element("div")
                .with_class("pb-widget")
                .with_attr("draggable", "true")
                .with_attr("data-widget", widget.kind.as_str())
                .with_child(VNode::text(widget.label))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_model::{find_widget, list_widgets, ElementKind};

    fn field_node<'a>(root: &'a VNode, key: &str) -> Option<&'a VNode> {
        root.find(&|n| n.attr("data-field") == Some(key))
    }

    #[test]
    fn test_empty_state() {
        let view = render_inspector(None, InspectorTab::Content);
        assert_eq!(view.text_content(), "Select an element to edit");
    }

    #[test]
    fn test_header_shows_short_id_and_delete() {
        let element = find_widget("quote").unwrap().instantiate("0123456789abcdef");
        let view = render_inspector(Some(&element), InspectorTab::Content);
        assert!(view.find(&|n| n.text_content() == "ID: 01234567").is_some());
        assert!(view.find(&|n| n.attr("data-action") == Some("delete")).is_some());
    }

    #[test]
    fn test_section_slider_reflects_stored_columns() {
        let element = PageElement::new("s", ElementKind::Section).with_content("columns", 3);
        let view = render_inspector(Some(&element), InspectorTab::Content);
        let slider = field_node(&view, "columns").unwrap();
        assert_eq!(slider.attr("type"), Some("range"));
        assert_eq!(slider.attr("value"), Some("3"));
        assert_eq!(slider.attr("max"), Some("4"));
    }

    #[test]
    fn test_gallery_has_no_content_fields() {
        let element = find_widget("gallery").unwrap().instantiate("g");
        let view = render_inspector(Some(&element), InspectorTab::Content);
        assert!(view
            .find(&|n| n.text_content() == "No content settings for this element.")
            .is_some());
    }

    #[test]
    fn test_style_tab_marks_selected_option() {
        let element = PageElement::new("t", ElementKind::Text).with_style("textAlign", "center");
        let view = render_inspector(Some(&element), InspectorTab::Style);
        let selected = view.find(&|n| n.attr("selected").is_some()).unwrap();
        assert_eq!(selected.attr("value"), Some("center"));
        assert_eq!(
            field_node(&view, "textAlign").and_then(|n| n.tag()),
            Some("select")
        );
    }

    #[test]
    fn test_image_field_offers_upload() {
        let element = find_widget("image").unwrap().instantiate("i");
        let view = render_inspector(Some(&element), InspectorTab::Content);
        assert!(view.find(&|n| n.attr("data-upload-field") == Some("src")).is_some());
        assert!(view.find(&|n| n.has_class("pb-preview")).is_some());
    }

    #[test]
    fn test_palette_lists_catalog() {
        let palette = render_palette(list_widgets());
        let entries = palette.find_all(&|n| n.attr("data-widget").is_some());
        assert_eq!(entries.len(), list_widgets().len());
    }
}
