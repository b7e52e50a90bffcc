//! Serialization round trips of whole element trees

use marble_model::{decode_elements, ElementKind, PageDocument, PageElement};
use serde_json::json;

fn sample_tree() -> Vec<PageElement> {
    vec![
        PageElement::new("s-1", ElementKind::Section)
            .with_content("columns", 2)
            .with_style("backgroundColor", "#f8fafc")
            .with_child(
                PageElement::new("t-1", ElementKind::Text)
                    .with_content("text", "<p>Marble</p>")
                    .with_content("columnIndex", 0),
            )
            .with_child(
                PageElement::new("i-1", ElementKind::Image)
                    .with_content("src", "https://example.com/a.jpg")
                    .with_content("alt", "Slab")
                    .with_content("columnIndex", 1),
            ),
        PageElement::new("q-1", ElementKind::Quote).with_content("text", "Timeless"),
        PageElement::new("x-1", ElementKind::Unknown("marquee".into()))
            .with_content("speed", json!({ "fast": true })),
    ]
}

#[test]
fn test_tree_round_trips_element_for_element() {
    let tree = sample_tree();
    let value = serde_json::to_value(&tree).unwrap();
    let decoded = decode_elements(value);

    assert!(!decoded.malformed);
    assert_eq!(decoded.skipped, 0);
    assert_eq!(decoded.elements, tree);
}

#[test]
fn test_document_round_trips_through_json_text() {
    let doc = PageDocument::new("home", "Home", sample_tree());
    let text = serde_json::to_string(&doc).unwrap();
    let back: PageDocument = serde_json::from_str(&text).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_absent_styles_stay_absent() {
    let value = json!([{ "id": "a", "type": "text", "content": { "text": "x" } }]);
    let decoded = decode_elements(value.clone());
    assert_eq!(serde_json::to_value(&decoded.elements).unwrap(), value);
}
