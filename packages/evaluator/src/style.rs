use crate::vdom::VNode;
use marble_model::PageElement;

/// Style keys that map directly onto CSS properties
const CSS_PROPERTIES: &[(&str, &str)] = &[
    ("color", "color"),
    ("textAlign", "text-align"),
    ("backgroundColor", "background-color"),
    ("padding", "padding"),
    ("margin", "margin"),
];

/// Style keys whose values select a preset class
const CLASS_PRESETS: &[(&str, &str)] = &[("boxShadow", "shadow"), ("animation", "animate")];

/// Apply an element's presentation overrides to its wrapper node
pub fn apply_styles(mut node: VNode, element: &PageElement) -> VNode {
    for (key, property) in CSS_PROPERTIES {
        if let Some(value) = element.style(key) {
            node = node.with_style(*property, sanitize_css_value(value));
        }
    }
    for (key, prefix) in CLASS_PRESETS {
        if let Some(value) = element.style(key).filter(|v| *v != "none") {
            let slug: String = value
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            if !slug.is_empty() {
                node = node.with_class(format!("{}-{}", prefix, slug));
            }
        }
    }
    node
}

/// Keep a value from escaping its declaration
fn sanitize_css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Serialize a style map as an inline `style` attribute value
pub fn inline_css<'a>(styles: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    styles
        .into_iter()
        .map(|(key, value)| format!("{}: {};", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_model::ElementKind;

    #[test]
    fn test_known_styles_become_css() {
        let element = PageElement::new("a", ElementKind::Text)
            .with_style("textAlign", "center")
            .with_style("backgroundColor", "#fff")
            .with_style("unknownKey", "ignored");
        let node = apply_styles(VNode::element("div"), &element);

        assert_eq!(node.style("text-align"), Some("center"));
        assert_eq!(node.style("background-color"), Some("#fff"));
        assert_eq!(node.style("unknownKey"), None);
    }

    #[test]
    fn test_presets_become_classes() {
        let element = PageElement::new("a", ElementKind::Card)
            .with_style("boxShadow", "lg")
            .with_style("animation", "none");
        let node = apply_styles(VNode::element("div"), &element);

        assert!(node.has_class("shadow-lg"));
        assert!(node.attr("class").map_or(true, |c| !c.contains("animate")));
    }

    #[test]
    fn test_values_cannot_break_out() {
        let element = PageElement::new("a", ElementKind::Text).with_style("color", "red; position: fixed");
        let node = apply_styles(VNode::element("div"), &element);
        assert_eq!(node.style("color"), Some("red position: fixed"));
    }
}
