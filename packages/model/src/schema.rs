//! # Kind Schemas
//!
//! One lookup table describes every known element kind: its catalog label,
//! default content, the content fields the inspector edits, and whether it
//! owns children. Renderers and forms dispatch through [`schema_for`] instead
//! of branching on the kind string.

use crate::element::{ElementKind, FieldMap};
use serde_json::{json, Value};

/// How a field is edited
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    /// Single-line text
    Line,
    /// Multi-line plain text
    Paragraph,
    /// Multi-line raw markup
    Markup,
    /// Integer slider (inclusive bounds)
    Slider { min: i64, max: i64 },
    /// Image URL with upload support
    Image,
    /// Plain URL
    Url,
    /// Colour picker paired with a text box
    Color,
    /// Fixed set of `(value, label)` options
    Select(&'static [(&'static str, &'static str)]),
}

impl InputKind {
    pub fn supports_upload(&self) -> bool {
        matches!(self, InputKind::Image)
    }
}

/// One editable field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub placeholder: &'static str,
}

impl FieldSpec {
    const fn new(key: &'static str, label: &'static str, input: InputKind) -> Self {
        Self {
            key,
            label,
            input,
            placeholder: "",
        }
    }

    const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Convert raw input text into the stored JSON value
    pub fn coerce(&self, raw: &str) -> Value {
        match self.input {
            InputKind::Slider { min, max } => {
                let parsed = raw.trim().parse::<f64>().map(|f| f.round() as i64).unwrap_or(min);
                Value::from(parsed.clamp(min, max))
            }
            InputKind::Select(options) => {
                if options.iter().any(|(value, _)| *value == raw) {
                    Value::from(raw)
                } else {
                    Value::from(options.first().map(|(value, _)| *value).unwrap_or(""))
                }
            }
            _ => Value::from(raw),
        }
    }

    /// Value shown in the form when the field is unset
    pub fn display_default(&self) -> String {
        match self.input {
            InputKind::Slider { min, .. } => min.to_string(),
            InputKind::Select(options) => options
                .first()
                .map(|(value, _)| value.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Descriptor for one element kind
#[derive(Debug, Clone, Copy)]
pub struct KindSchema {
    pub tag: &'static str,
    pub label: &'static str,
    /// Owns children partitioned into column slots
    pub container: bool,
    pub fields: &'static [FieldSpec],
    defaults: fn() -> Value,
}

impl KindSchema {
    pub fn kind(&self) -> ElementKind {
        ElementKind::from(self.tag)
    }

    pub fn default_content(&self) -> FieldMap {
        match (self.defaults)() {
            Value::Object(map) => map,
            _ => FieldMap::new(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }
}

const ALIGN_OPTIONS: &[(&str, &str)] = &[("left", "Left"), ("center", "Center"), ("right", "Right")];

const SHADOW_OPTIONS: &[(&str, &str)] = &[
    ("none", "None"),
    ("sm", "Small"),
    ("md", "Medium"),
    ("lg", "Large"),
    ("xl", "Extra Large"),
];

const ANIMATION_OPTIONS: &[(&str, &str)] = &[
    ("none", "None"),
    ("fade-up", "Fade Up"),
    ("fade-in", "Fade In"),
    ("zoom-in", "Zoom In"),
];

/// Style fields shared by every kind
pub const STYLE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("color", "Color", InputKind::Color).placeholder("#000000"),
    FieldSpec::new("textAlign", "Align", InputKind::Select(ALIGN_OPTIONS)),
    FieldSpec::new("backgroundColor", "Background Color", InputKind::Color).placeholder("#ffffff"),
    FieldSpec::new("padding", "Padding", InputKind::Line).placeholder("e.g. 2rem"),
    FieldSpec::new("margin", "Margin", InputKind::Line).placeholder("e.g. 2rem"),
    FieldSpec::new("boxShadow", "Shadow", InputKind::Select(SHADOW_OPTIONS)),
    FieldSpec::new("animation", "Animation", InputKind::Select(ANIMATION_OPTIONS)),
];

/// Largest column count a section can hold
pub const MAX_COLUMNS: i64 = 4;

const SCHEMAS: &[KindSchema] = &[
    KindSchema {
        tag: "section",
        label: "Section",
        container: true,
        fields: &[FieldSpec::new("columns", "Columns", InputKind::Slider { min: 1, max: MAX_COLUMNS })],
        defaults: || json!({ "columns": 1 }),
    },
    KindSchema {
        tag: "hero",
        label: "Hero Section",
        container: false,
        fields: &[
            FieldSpec::new("title", "Title", InputKind::Line),
            FieldSpec::new("subtitle", "Subtitle", InputKind::Paragraph),
            FieldSpec::new("cta", "Button Text (CTA)", InputKind::Line),
        ],
        defaults: || json!({ "title": "Hero Title", "subtitle": "Hero Subtitle", "cta": "Click Me" }),
    },
    KindSchema {
        tag: "text",
        label: "Text Block",
        container: false,
        fields: &[FieldSpec::new("text", "Text Content (HTML)", InputKind::Markup)],
        defaults: || json!({ "text": "Lorem ipsum dolor sit amet..." }),
    },
    KindSchema {
        tag: "image",
        label: "Image",
        container: false,
        fields: &[
            FieldSpec::new("src", "Image Source", InputKind::Image).placeholder("Or enter URL..."),
            FieldSpec::new("alt", "Alt Text", InputKind::Line),
        ],
        defaults: || json!({ "src": "https://placehold.co/600x400", "alt": "Placeholder" }),
    },
    KindSchema {
        tag: "button",
        label: "Button",
        container: false,
        fields: &[
            FieldSpec::new("label", "Label", InputKind::Line),
            FieldSpec::new("href", "Link", InputKind::Url),
        ],
        defaults: || json!({ "label": "Learn more", "href": "#" }),
    },
    KindSchema {
        tag: "video",
        label: "Video",
        container: false,
        fields: &[FieldSpec::new("url", "Video URL", InputKind::Url)],
        defaults: || json!({ "url": "https://www.youtube.com/embed/" }),
    },
    KindSchema {
        tag: "card",
        label: "Card",
        container: false,
        fields: &[
            FieldSpec::new("image", "Image", InputKind::Image).placeholder("Or enter URL..."),
            FieldSpec::new("title", "Title", InputKind::Line),
            FieldSpec::new("description", "Description", InputKind::Paragraph),
        ],
        defaults: || {
            json!({
                "image": "https://placehold.co/600x400",
                "title": "Card Title",
                "description": "Card description"
            })
        },
    },
    KindSchema {
        tag: "gallery",
        label: "Gallery",
        container: false,
        fields: &[],
        defaults: || json!({ "images": [] }),
    },
    KindSchema {
        tag: "quote",
        label: "Quote",
        container: false,
        fields: &[
            FieldSpec::new("text", "Quote Text", InputKind::Paragraph),
            FieldSpec::new("author", "Author", InputKind::Line),
        ],
        defaults: || json!({ "text": "Quote text", "author": "" }),
    },
    KindSchema {
        tag: "container",
        label: "Container",
        container: true,
        fields: &[FieldSpec::new("padding", "Padding", InputKind::Line)],
        defaults: || json!({ "padding": "p-4" }),
    },
];

/// Schema for a kind; `None` for unknown kinds
pub fn schema_for(kind: &ElementKind) -> Option<&'static KindSchema> {
    let tag = kind.as_str();
    SCHEMAS.iter().find(|schema| schema.tag == tag)
}

/// Every known schema, in catalog order
pub fn all_schemas() -> &'static [KindSchema] {
    SCHEMAS
}

/// Style field by key
pub fn style_field(key: &str) -> Option<&'static FieldSpec> {
    STYLE_FIELDS.iter().find(|field| field.key == key)
}
