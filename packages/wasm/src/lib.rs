use marble_editor::{DragSource, DropTarget, EditSession, Pipeline, Point};
use marble_evaluator::{render_palette, to_html, Device, FieldGroup, HtmlOptions, MarkupPolicy};
use marble_model::{decode_elements, list_widgets};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// In-browser edit session for one page
#[wasm_bindgen]
pub struct PageBuilder {
    pipeline: Pipeline,
}

#[wasm_bindgen]
impl PageBuilder {
    #[wasm_bindgen(constructor)]
    pub fn new(drag_threshold: f64, sanitize_markup: bool) -> PageBuilder {
        let session = EditSession::new("browser", Vec::new())
            .with_drag_threshold(drag_threshold)
            .with_markup_policy(MarkupPolicy::from_sanitize_flag(sanitize_markup));
        PageBuilder {
            pipeline: Pipeline::new(session),
        }
    }

    /// Replace the tree with stored content. Non-array content loads empty.
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&mut self, json: &str) -> Result<usize, JsValue> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(js_error)?;
        let decoded = decode_elements(value);
        let count = decoded.elements.len();
        self.pipeline.session_mut().load(decoded.elements);
        Ok(count)
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> String {
        self.pipeline.session().tree().serialize().to_string()
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, widget: &str, x: f64, y: f64) -> bool {
        self.pipeline
            .session_mut()
            .pointer_down(&DragSource::Widget(widget.to_string()), Point::new(x, y))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.pipeline.session_mut().pointer_move(Point::new(x, y))
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.pipeline.session().drag().is_dragging()
    }

    /// Release over the canvas; returns the new element id
    #[wasm_bindgen(js_name = dropOnCanvas)]
    pub fn drop_on_canvas(&mut self) -> Result<Option<String>, JsValue> {
        self.pipeline
            .session_mut()
            .pointer_up(DropTarget::Canvas)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = dropInColumn)]
    pub fn drop_in_column(&mut self, section_id: &str, column_index: usize) -> Result<Option<String>, JsValue> {
        self.pipeline
            .session_mut()
            .pointer_up(DropTarget::Column {
                section_id: section_id.to_string(),
                column_index,
            })
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = dropOutside)]
    pub fn drop_outside(&mut self) {
        // Discarding drops never touch the tree
        let _ = self.pipeline.session_mut().pointer_up(DropTarget::Outside);
    }

    pub fn select(&mut self, id: Option<String>) -> bool {
        self.pipeline.session_mut().select(id.as_deref())
    }

    #[wasm_bindgen(getter)]
    pub fn selection(&self) -> Option<String> {
        self.pipeline.session().selection().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> u64 {
        self.pipeline.session().tree().version()
    }

    /// Single-field edit of the selection; `group` is "content" or "styles"
    #[wasm_bindgen(js_name = editField)]
    pub fn edit_field(&mut self, group: &str, key: &str, value: &str) -> Result<bool, JsValue> {
        let group = match group {
            "content" => FieldGroup::Content,
            "styles" => FieldGroup::Styles,
            other => return Err(js_error(format!("unknown field group: {}", other))),
        };
        self.pipeline
            .session_mut()
            .edit_field(group, key, value)
            .map(|result| result.applied)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> bool {
        self.pipeline.session_mut().delete_selected().unwrap_or(false)
    }

    #[wasm_bindgen(js_name = setDevice)]
    pub fn set_device(&mut self, device: &str) -> Result<(), JsValue> {
        let device: Device = device
            .parse()
            .map_err(|_| js_error(format!("unknown device: {}", device)))?;
        self.pipeline.session_mut().set_device(device);
        Ok(())
    }

    #[wasm_bindgen(js_name = canvasHtml)]
    pub fn canvas_html(&mut self) -> String {
        self.pipeline.canvas_html(&HtmlOptions::compact())
    }

    #[wasm_bindgen(js_name = inspectorHtml)]
    pub fn inspector_html(&self) -> String {
        to_html(&self.pipeline.session().render_inspector(), &HtmlOptions::compact())
    }
}

/// Palette markup for the widget catalog
#[wasm_bindgen(js_name = paletteHtml)]
pub fn palette_html() -> String {
    to_html(&render_palette(list_widgets()), &HtmlOptions::compact())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(builder: &mut PageBuilder, widget: &str) {
        assert!(builder.pointer_down(widget, 0.0, 0.0));
        builder.pointer_move(20.0, 0.0);
        assert!(builder.is_dragging());
    }

    #[test]
    fn test_drop_edit_and_export() {
        let mut builder = PageBuilder::new(8.0, true);
        drag(&mut builder, "section");
        let id = builder.drop_on_canvas().unwrap().unwrap();
        assert_eq!(builder.selection(), Some(id.clone()));

        assert!(builder.edit_field("content", "columns", "3").unwrap());

        drag(&mut builder, "text");
        let child = builder.drop_in_column(&id, 2).unwrap().unwrap();
        assert_eq!(builder.selection(), Some(child));
        let exported: serde_json::Value = serde_json::from_str(&builder.to_json()).unwrap();
        assert_eq!(exported[0]["content"]["columns"], 3);

        builder.set_device("mobile").unwrap();
        assert!(builder.canvas_html().contains("repeat(1, minmax(0, 1fr))"));
    }

    #[test]
    fn test_load_and_drop_outside() {
        let mut builder = PageBuilder::new(8.0, true);
        let loaded = builder
            .load_json(r#"[{ "id": "q", "type": "quote", "content": { "text": "Stone" } }]"#)
            .unwrap();
        assert_eq!(loaded, 1);

        drag(&mut builder, "text");
        builder.drop_outside();
        assert_eq!(builder.load_json("{}").unwrap(), 0);
        assert_eq!(builder.to_json(), "[]");
    }

    #[test]
    fn test_palette_lists_widgets() {
        let html = palette_html();
        assert!(html.contains(r#"data-widget="section""#));
        assert!(html.contains(r#"data-widget="quote""#));
    }
}
