//! Serialize virtual DOM nodes to HTML text

use crate::style::inline_css;
use crate::vdom::VNode;

/// Options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: String::new(),
        }
    }
}

struct Context<'a> {
    options: &'a HtmlOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_indent(&mut self) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.buffer.push_str(&self.options.indent);
            }
        }
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.buffer.push('\n');
        }
    }
}

/// Render one node tree to HTML
pub fn to_html(node: &VNode, options: &HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    write_node(node, &mut ctx);
    ctx.buffer
}

fn write_node(node: &VNode, ctx: &mut Context) {
    match node {
        VNode::Element {
            tag,
            attributes,
            styles,
            children,
        } => {
            ctx.add_indent();
            ctx.add("<");
            ctx.add(tag);
            for (name, value) in attributes {
                ctx.add(" ");
                ctx.add(name);
                ctx.add("=\"");
                ctx.add(&escape_html(value));
                ctx.add("\"");
            }
            if !styles.is_empty() {
                ctx.add(" style=\"");
                ctx.add(&escape_html(&inline_css(styles)));
                ctx.add("\"");
            }

            if children.is_empty() && is_self_closing(tag) {
                ctx.add(" />");
                ctx.newline();
                return;
            }
            ctx.add(">");

            let block = has_element_children(children);
            if block {
                ctx.newline();
                ctx.depth += 1;
                for child in children {
                    write_node(child, ctx);
                }
                ctx.depth -= 1;
                ctx.add_indent();
            } else {
                for child in children {
                    write_inline(child, ctx);
                }
            }

            ctx.add("</");
            ctx.add(tag);
            ctx.add(">");
            ctx.newline();
        }
        VNode::Text { .. } | VNode::Markup { .. } | VNode::Comment { .. } => {
            ctx.add_indent();
            write_inline(node, ctx);
            ctx.newline();
        }
    }
}

fn write_inline(node: &VNode, ctx: &mut Context) {
    match node {
        VNode::Text { content } => ctx.add(&escape_html(content)),
        VNode::Markup { content } => ctx.add(content),
        VNode::Comment { content } => {
            ctx.add("<!-- ");
            ctx.add(&content.replace("--", "- -"));
            ctx.add(" -->");
        }
        VNode::Element { .. } => write_node(node, ctx),
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "input" | "br" | "hr" | "meta" | "link" | "source" | "wbr"
    )
}

fn has_element_children(children: &[VNode]) -> bool {
    children
        .iter()
        .any(|child| matches!(child, VNode::Element { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_escaped_markup_is_not() {
        let node = VNode::element("div")
            .with_child(VNode::text("<b>&</b>"))
            .with_child(VNode::markup("<i>ok</i>"));
        let html = to_html(&node, &HtmlOptions::compact());
        assert_eq!(html, "<div>&lt;b&gt;&amp;&lt;/b&gt;<i>ok</i></div>");
    }

    #[test]
    fn test_attributes_are_escaped_and_ordered() {
        let node = VNode::element("a")
            .with_attr("title", "say \"hi\"")
            .with_attr("href", "/x?a=1&b=2")
            .with_child(VNode::text("x"));
        let html = to_html(&node, &HtmlOptions::compact());
        assert_eq!(html, "<a href=\"/x?a=1&amp;b=2\" title=\"say &quot;hi&quot;\">x</a>");
    }

    #[test]
    fn test_void_elements_self_close() {
        let node = VNode::element("img").with_attr("src", "a.png");
        assert_eq!(to_html(&node, &HtmlOptions::compact()), "<img src=\"a.png\" />");
    }

    #[test]
    fn test_styles_render_inline() {
        let node = VNode::element("div")
            .with_style("color", "red")
            .with_style("text-align", "center");
        assert_eq!(
            to_html(&node, &HtmlOptions::compact()),
            "<div style=\"color: red; text-align: center;\"></div>"
        );
    }

    #[test]
    fn test_pretty_output_indents_nested_elements() {
        let node = VNode::element("ul")
            .with_child(VNode::element("li").with_child(VNode::text("a")))
            .with_child(VNode::element("li").with_child(VNode::text("b")));
        let html = to_html(&node, &HtmlOptions::default());
        assert_eq!(html, "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_comments_cannot_terminate_early() {
        let html = to_html(&VNode::comment("a -- b"), &HtmlOptions::compact());
        assert_eq!(html, "<!-- a - - b -->");
    }
}
