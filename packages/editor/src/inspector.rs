//! Inspector edit dispatch: one form change becomes one single-field patch.

use marble_evaluator::FieldGroup;
use marble_model::schema::style_field;
use marble_model::{schema_for, ElementPatch, ModelError, PageElement};
use serde_json::Value;

/// Build the patch for a raw form value.
///
/// Known fields are coerced through their `FieldSpec` (sliders clamp, selects fall
/// back to their first option). Elements of unknown kind accept any content
/// key as plain text so their data can still be edited.
pub fn field_patch(
    element: &PageElement,
    group: FieldGroup,
    key: &str,
    raw: &str,
) -> Result<ElementPatch, ModelError> {
    match group {
        FieldGroup::Content => {
            let value = match schema_for(&element.kind) {
                Some(schema) => schema
                    .field(key)
                    .map(|field| field.coerce(raw))
                    .ok_or_else(|| ModelError::UnknownField {
                        kind: element.kind.to_string(),
                        key: key.to_string(),
                    })?,
                None => Value::from(raw),
            };
            Ok(ElementPatch::content(key, value))
        }
        FieldGroup::Styles => {
            let field = style_field(key).ok_or_else(|| ModelError::UnknownField {
                kind: element.kind.to_string(),
                key: key.to_string(),
            })?;
            Ok(ElementPatch::style(key, field.coerce(raw)))
        }
    }
}

/// Patch setting an image field to an uploaded file's public URL
pub fn upload_patch(group: FieldGroup, key: &str, url: &str) -> ElementPatch {
    match group {
        FieldGroup::Content => ElementPatch::content(key, url),
        FieldGroup::Styles => ElementPatch::style(key, url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_model::ElementKind;
    use serde_json::json;

    #[test]
    fn test_columns_are_clamped() {
        let section = PageElement::new("s", ElementKind::Section);
        let patch = field_patch(&section, FieldGroup::Content, "columns", "3").unwrap();
        assert_eq!(patch, ElementPatch::content("columns", 3));

        let patch = field_patch(&section, FieldGroup::Content, "columns", "12").unwrap();
        assert_eq!(patch.content.unwrap().get("columns"), Some(&json!(4)));

        let patch = field_patch(&section, FieldGroup::Content, "columns", "0").unwrap();
        assert_eq!(patch.content.unwrap().get("columns"), Some(&json!(1)));
    }

    #[test]
    fn test_text_fields_stay_verbatim() {
        let text = PageElement::new("t", ElementKind::Text);
        let patch = field_patch(&text, FieldGroup::Content, "text", "<p>Hi</p>").unwrap();
        assert_eq!(patch, ElementPatch::content("text", "<p>Hi</p>"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = PageElement::new("t", ElementKind::Text);
        assert!(matches!(
            field_patch(&text, FieldGroup::Content, "bogus", "x"),
            Err(ModelError::UnknownField { .. })
        ));
        assert!(field_patch(&text, FieldGroup::Styles, "zIndex", "9").is_err());
    }

    #[test]
    fn test_style_select_falls_back() {
        let text = PageElement::new("t", ElementKind::Text);
        let patch = field_patch(&text, FieldGroup::Styles, "textAlign", "justify").unwrap();
        assert_eq!(patch, ElementPatch::style("textAlign", "left"));
    }

    #[test]
    fn test_unknown_kind_accepts_any_key() {
        let odd = PageElement::new("x", ElementKind::Unknown("marquee".into()));
        let patch = field_patch(&odd, FieldGroup::Content, "speed", "fast").unwrap();
        assert_eq!(patch, ElementPatch::content("speed", "fast"));
    }
}
