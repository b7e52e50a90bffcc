//! # Marble Evaluator
//!
//! Pure rendering for the page builder. An element tree goes in, a virtual
//! DOM comes out, and [`html`] turns that into text for the browser.
//!
//! ```text
//! &[PageElement] ──Canvas──▶ VNode ──to_html──▶ String
//!        │                     ▲
//!   selected id, Device        └── form::render_inspector(selected)
//! ```
//!
//! Nothing here touches the stored tree: simulated devices only change how
//! many grid tracks a section flows into.

pub mod canvas;
pub mod form;
pub mod html;
pub mod markup;
pub mod style;
pub mod vdom;
pub mod viewport;

pub use canvas::{render_canvas, section_layout, Canvas, RenderMode, SectionLayout};
pub use form::{render_field, render_inspector, render_palette, FieldGroup, InspectorTab};
pub use html::{escape_html, to_html, HtmlOptions};
pub use markup::{is_safe_url, sanitize_markup, MarkupPolicy, SAFE_URL_SCHEMES};
pub use vdom::VNode;
pub use viewport::Device;
