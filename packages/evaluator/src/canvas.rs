//! # Canvas Renderer
//!
//! Turns an element tree into a virtual DOM. Rendering is a pure function of
//! the tree, the selected id and the simulated device; nothing here mutates
//! or retains the elements it is given.
//!
//! ## Modes
//!
//! - **Editing**: every element carries `data-element-id` so clicks can be
//!   mapped back to a selection, the selected element gets a ring, sections
//!   show column slots as drop targets, and an empty canvas shows a hint.
//! - **Published**: the same layout without builder chrome, used by the
//!   public site.
//!
//! Dispatch goes through [`RENDERERS`], one entry per known kind. Unknown
//! kinds render a visible marker instead of failing.

use crate::markup::{is_safe_url, MarkupPolicy};
use crate::style::apply_styles;
use crate::viewport::Device;
use crate::vdom::VNode;
use marble_model::schema::MAX_COLUMNS;
use marble_model::{ElementKind, PageElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Editing,
    Published,
}

/// How a container's column slots are laid out on the current device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    /// Column slots, from the stored `columns` value (1..=4)
    pub slots: usize,
    /// Grid tracks the slots flow into on the simulated device
    pub tracks: usize,
}

/// Layout of a container on a device; display only
pub fn section_layout(element: &PageElement, device: Device) -> SectionLayout {
    let slots = match element.kind {
        ElementKind::Section => element.columns().min(MAX_COLUMNS as usize),
        _ => 1,
    };
    SectionLayout {
        slots,
        tracks: device.layout_columns(slots),
    }
}

/// Renderer settings for one pass
#[derive(Debug, Clone, Copy)]
pub struct Canvas<'a> {
    selected: Option<&'a str>,
    device: Device,
    mode: RenderMode,
    markup: MarkupPolicy,
}

type KindRenderer = fn(&Canvas<'_>, &PageElement) -> VNode;

const RENDERERS: &[(&str, KindRenderer)] = &[
    ("section", render_section),
    ("container", render_container),
    ("hero", render_hero),
    ("text", render_text),
    ("image", render_image),
    ("button", render_button),
    ("video", render_video),
    ("card", render_card),
    ("gallery", render_gallery),
    ("quote", render_quote),
];

fn renderer_for(kind: &ElementKind) -> KindRenderer {
    let tag = kind.as_str();
    RENDERERS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, render)| *render)
        .unwrap_or(render_unknown)
}

impl<'a> Canvas<'a> {
    /// Builder canvas with selection chrome
    pub fn editing(selected: Option<&'a str>, device: Device) -> Self {
        Self {
            selected,
            device,
            mode: RenderMode::Editing,
            markup: MarkupPolicy::default(),
        }
    }

    /// Public page output
    pub fn published(device: Device) -> Self {
        Self {
            selected: None,
            device,
            mode: RenderMode::Published,
            markup: MarkupPolicy::default(),
        }
    }

    pub fn with_markup_policy(mut self, markup: MarkupPolicy) -> Self {
        self.markup = markup;
        self
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    fn editing_mode(&self) -> bool {
        self.mode == RenderMode::Editing
    }

    /// Render the whole top-level sequence inside the canvas surface
    pub fn render(&self, elements: &[PageElement]) -> VNode {
        match self.mode {
            RenderMode::Editing => {
                let surface = VNode::element("div")
                    .with_class("pb-canvas")
                    .with_attr("data-drop-target", "canvas")
                    .with_attr("data-deselect", "true")
                    .with_attr("data-device", self.device.as_str())
                    .with_style("max-width", format!("{}px", self.device.width()));

                if elements.is_empty() {
                    surface.with_child(
                        VNode::element("div")
                            .with_class("pb-empty")
                            .with_child(VNode::element("p").with_child(VNode::text("Empty canvas")))
                            .with_child(
                                VNode::element("p")
                                    .with_child(VNode::text("Drag a \"Section\" widget here to start")),
                            ),
                    )
                } else {
                    surface.with_children(elements.iter().map(|el| self.render_element(el)))
                }
            }
            RenderMode::Published => VNode::element("div")
                .with_class("pb-page")
                .with_attr("data-device", self.device.as_str())
                .with_children(elements.iter().map(|el| self.render_element(el))),
        }
    }

    /// Render one element and its descendants
    pub fn render_element(&self, element: &PageElement) -> VNode {
        let node = renderer_for(&element.kind)(self, element);
        self.decorate(element, node)
    }

    fn decorate(&self, element: &PageElement, node: VNode) -> VNode {
        let node = apply_styles(node, element).with_class(format!("pb-{}", kind_class(&element.kind)));
        if !self.editing_mode() {
            return node;
        }
        let node = node
            .with_class("pb-element")
            .with_attr("data-element-id", element.id.as_str())
            .with_attr("data-select", "true");
        if self.selected == Some(element.id.as_str()) {
            node.with_class("is-selected")
        } else {
            node
        }
    }

    fn render_slots(&self, element: &PageElement, label: &str) -> VNode {
        let layout = section_layout(element, self.device);
        let mut grid = VNode::element("div")
            .with_class("pb-grid")
            .with_attr("data-tracks", layout.tracks.to_string())
            .with_style("display", "grid")
            .with_style("gap", "1rem")
            .with_style(
                "grid-template-columns",
                format!("repeat({}, minmax(0, 1fr))", layout.tracks),
            );

        for index in 0..layout.slots {
            let mut slot = VNode::element("div").with_class("pb-column");
            if self.editing_mode() {
                slot = slot
                    .with_attr("data-drop-target", "column")
                    .with_attr("data-section-id", element.id.as_str())
                    .with_attr("data-column", index.to_string())
                    .with_child(
                        VNode::element("span")
                            .with_class("pb-column-label")
                            .with_child(VNode::text(format!("Column {}", index + 1))),
                    );
            }
            slot = slot.with_children(
                element
                    .children_in_column(index)
                    .map(|child| self.render_element(child)),
            );
            grid = grid.with_child(slot);
        }

        let mut node = VNode::element("section");
        if self.editing_mode() && self.selected == Some(element.id.as_str()) {
            node = node.with_child(
                VNode::element("div")
                    .with_class("pb-badge")
                    .with_child(VNode::text(label)),
            );
        }
        node.with_child(grid)
    }

    fn safe_url(&self, url: &str) -> String {
        if self.markup == MarkupPolicy::Sanitized && !is_safe_url(url) {
            "#".to_string()
        } else {
            url.to_string()
        }
    }
}

fn kind_class(kind: &ElementKind) -> String {
    let class: String = kind
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if kind.is_unknown() || class.is_empty() {
        "unknown".to_string()
    } else {
        class
    }
}

fn render_section(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    canvas.render_slots(element, "Section")
}

fn render_container(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    let padding: String = element
        .text("padding")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    canvas.render_slots(element, "Container").with_class(padding)
}

fn render_hero(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    VNode::element("div")
        .with_child(VNode::element("h1").with_child(VNode::text(element.text("title"))))
        .with_child(VNode::element("p").with_child(VNode::text(element.text("subtitle"))))
        .with_child(
            VNode::element("a")
                .with_class("pb-cta")
                .with_attr("href", canvas.safe_url(element.content.get("href").and_then(|v| v.as_str()).unwrap_or("#")))
                .with_child(VNode::text(element.text("cta"))),
        )
}

fn render_text(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    VNode::element("div").with_child(
        VNode::element("div")
            .with_class("prose")
            .with_child(VNode::markup(canvas.markup.apply(element.text("text")))),
    )
}

fn render_image(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    VNode::element("div").with_child(
        VNode::element("img")
            .with_attr("src", canvas.safe_url(element.text("src")))
            .with_attr("alt", element.text("alt")),
    )
}

fn render_button(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    let href = match element.text("href") {
        "" => "#".to_string(),
        href => canvas.safe_url(href),
    };
    VNode::element("div").with_child(
        VNode::element("a")
            .with_class("pb-cta")
            .with_attr("href", href)
            .with_child(VNode::text(element.text("label"))),
    )
}

fn render_video(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    let url = element.text("url");
    let embeddable = url.starts_with("https://") || url.starts_with("http://");
    let frame = if canvas.mode() == RenderMode::Published && embeddable {
        VNode::element("iframe")
            .with_attr("src", url)
            .with_attr("allowfullscreen", "true")
            .with_attr("loading", "lazy")
    } else {
        VNode::element("div")
            .with_class("pb-video-placeholder")
            .with_child(VNode::text(format!("Video Placeholder ({})", url)))
    };
    VNode::element("div").with_child(VNode::element("div").with_class("aspect-video").with_child(frame))
}

fn render_card(canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    let mut card = VNode::element("div");
    let image = element.text("image");
    if !image.is_empty() {
        card = card.with_child(
            VNode::element("img")
                .with_attr("src", canvas.safe_url(image))
                .with_attr("alt", element.text("title")),
        );
    }
    card.with_child(
        VNode::element("div")
            .with_class("pb-card-body")
            .with_child(VNode::element("h3").with_child(VNode::text(element.text("title"))))
            .with_child(VNode::element("p").with_child(VNode::text(element.text("description")))),
    )
}

/// Gallery content is not rendered yet; every gallery shows the same grid
fn render_gallery(_canvas: &Canvas<'_>, _element: &PageElement) -> VNode {
    VNode::element("div").with_child(
        VNode::element("div")
            .with_class("pb-gallery-grid")
            .with_children((1..=6).map(|n| {
                VNode::element("div")
                    .with_class("pb-gallery-tile")
                    .with_child(VNode::text(format!("Image {}", n)))
            })),
    )
}

fn render_quote(_canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    let mut quote = VNode::element("blockquote")
        .with_child(VNode::element("p").with_child(VNode::text(element.text("text"))));
    let author = element.text("author");
    if !author.is_empty() {
        quote = quote.with_child(VNode::element("cite").with_child(VNode::text(author)));
    }
    quote
}

fn render_unknown(_canvas: &Canvas<'_>, element: &PageElement) -> VNode {
    VNode::element("div").with_child(VNode::text(format!("Unknown Widget: {}", element.kind)))
}

/// Builder canvas for a tree, selection and device
pub fn render_canvas(elements: &[PageElement], selected: Option<&str>, device: Device) -> VNode {
    Canvas::editing(selected, device).render(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_model::element::COLUMN_INDEX_KEY;

    fn by_id<'a>(root: &'a VNode, id: &str) -> &'a VNode {
        root.find(&|n| n.attr("data-element-id") == Some(id))
            .unwrap_or_else(|| panic!("no node for {id}"))
    }

    fn column_slots(node: &VNode) -> Vec<&VNode> {
        node.find_all(&|n| n.has_class("pb-column"))
    }

    #[test]
    fn test_empty_canvas_shows_hint() {
        let root = render_canvas(&[], None, Device::Desktop);
        assert!(root.find(&|n| n.has_class("pb-empty")).is_some());
        assert_eq!(root.attr("data-drop-target"), Some("canvas"));
    }

    #[test]
    fn test_selected_element_is_marked() {
        let elements = vec![
            PageElement::new("a", ElementKind::Quote).with_content("text", "One"),
            PageElement::new("b", ElementKind::Quote).with_content("text", "Two"),
        ];
        let root = render_canvas(&elements, Some("b"), Device::Desktop);
        assert!(!by_id(&root, "a").has_class("is-selected"));
        assert!(by_id(&root, "b").has_class("is-selected"));
    }

    #[test]
    fn test_section_renders_children_by_column() {
        let section = PageElement::new("s", ElementKind::Section)
            .with_content("columns", 2)
            .with_child(PageElement::new("left", ElementKind::Quote).with_content(COLUMN_INDEX_KEY, 0))
            .with_child(PageElement::new("right", ElementKind::Quote).with_content(COLUMN_INDEX_KEY, 1))
            .with_child(PageElement::new("lost", ElementKind::Quote).with_content(COLUMN_INDEX_KEY, 5));
        let root = render_canvas(std::slice::from_ref(&section), None, Device::Desktop);

        let slots = column_slots(&root);
        assert_eq!(slots.len(), 2);
        assert!(slots[0].find(&|n| n.attr("data-element-id") == Some("left")).is_some());
        assert!(slots[1].find(&|n| n.attr("data-element-id") == Some("right")).is_some());
        assert!(root.find(&|n| n.attr("data-element-id") == Some("lost")).is_none());
    }

    #[test]
    fn test_mobile_collapses_layout_without_touching_content() {
        let section = PageElement::new("s", ElementKind::Section).with_content("columns", 3);

        let mobile = render_canvas(std::slice::from_ref(&section), None, Device::Mobile);
        let grid = mobile.find(&|n| n.has_class("pb-grid")).unwrap();
        assert_eq!(grid.attr("data-tracks"), Some("1"));

        let desktop = render_canvas(std::slice::from_ref(&section), None, Device::Desktop);
        let grid = desktop.find(&|n| n.has_class("pb-grid")).unwrap();
        assert_eq!(grid.attr("data-tracks"), Some("3"));

        assert_eq!(section.columns(), 3);
        assert_eq!(section_layout(&section, Device::Mobile), SectionLayout { slots: 3, tracks: 1 });
    }

    #[test]
    fn test_columns_capped_at_four() {
        let section = PageElement::new("s", ElementKind::Section).with_content("columns", 9);
        assert_eq!(section_layout(&section, Device::Desktop).slots, 4);
    }

    #[test]
    fn test_unknown_kind_renders_marker() {
        let element = PageElement::new("x", ElementKind::Unknown("marquee".into()));
        let root = render_canvas(&[element], None, Device::Desktop);
        let node = by_id(&root, "x");
        assert!(node.has_class("pb-unknown"));
        assert_eq!(node.text_content(), "Unknown Widget: marquee");
    }

    #[test]
    fn test_gallery_ignores_content() {
        let element = PageElement::new("g", ElementKind::Gallery)
            .with_content("images", serde_json::json!(["a.png"]));
        let root = render_canvas(&[element], None, Device::Desktop);
        let tiles = root.find_all(&|n| n.has_class("pb-gallery-tile"));
        assert_eq!(tiles.len(), 6);
    }

    #[test]
    fn test_text_markup_follows_policy() {
        let element = PageElement::new("t", ElementKind::Text)
            .with_content("text", "<p>hi</p><script>x()</script>");

        let sanitized = Canvas::published(Device::Desktop).render(std::slice::from_ref(&element));
        assert_eq!(sanitized.text_content(), "<p>hi</p>");

        let raw = Canvas::published(Device::Desktop)
            .with_markup_policy(MarkupPolicy::Raw)
            .render(std::slice::from_ref(&element));
        assert_eq!(raw.text_content(), "<p>hi</p><script>x()</script>");
    }

    #[test]
    fn test_published_output_has_no_builder_chrome() {
        let section = PageElement::new("s", ElementKind::Section)
            .with_child(PageElement::new("q", ElementKind::Quote).with_content(COLUMN_INDEX_KEY, 0));
        let root = Canvas::published(Device::Desktop).render(&[section]);
        assert!(root.find(&|n| n.attr("data-element-id").is_some()).is_none());
        assert!(root.find(&|n| n.has_class("pb-column-label")).is_none());
        assert!(root.find(&|n| n.tag() == Some("blockquote")).is_some());
    }

    #[test]
    fn test_styles_reach_the_wrapper() {
        let element = PageElement::new("c", ElementKind::Card).with_style("backgroundColor", "#eee");
        let root = render_canvas(&[element], None, Device::Desktop);
        assert_eq!(by_id(&root, "c").style("background-color"), Some("#eee"));
    }
}
