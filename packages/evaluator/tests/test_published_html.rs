use marble_evaluator::{to_html, Canvas, Device, HtmlOptions, MarkupPolicy};
use marble_model::{ElementKind, PageElement};

fn publish(elements: &[PageElement]) -> String {
    to_html(&Canvas::published(Device::Desktop).render(elements), &HtmlOptions::compact())
}

#[test]
fn test_text_markup_is_sanitized() {
    let html = publish(&[PageElement::new("t", ElementKind::Text)
        .with_content("text", "<p onclick=\"steal()\">Hi</p><script>steal()</script>")]);

    assert!(html.contains("<p>Hi</p>"));
    assert!(!html.contains("script"));
    assert!(!html.contains("onclick"));
}

#[test]
fn test_raw_markup_when_enabled() {
    let element = PageElement::new("t", ElementKind::Text).with_content("text", "<marquee>x</marquee>");
    let node = Canvas::published(Device::Desktop)
        .with_markup_policy(MarkupPolicy::Raw)
        .render(&[element]);
    assert!(to_html(&node, &HtmlOptions::compact()).contains("<marquee>x</marquee>"));
}

#[test]
fn test_plain_text_fields_are_escaped() {
    let html = publish(&[PageElement::new("q", ElementKind::Quote)
        .with_content("text", "<b>bold</b>")
        .with_content("author", "A & B")]);

    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    assert!(html.contains("<cite>A &amp; B</cite>"));
}

#[test]
fn test_video_embeds_only_on_published_pages() {
    let video = PageElement::new("v", ElementKind::Video)
        .with_content("url", "https://www.youtube.com/embed/abc");

    let published = publish(std::slice::from_ref(&video));
    assert!(published.contains("<iframe"));

    let editing = to_html(
        &Canvas::editing(None, Device::Desktop).render(&[video]),
        &HtmlOptions::compact(),
    );
    assert!(editing.contains("Video Placeholder (https://www.youtube.com/embed/abc)"));
    assert!(!editing.contains("<iframe"));
}

#[test]
fn test_button_rejects_script_links() {
    let html = publish(&[PageElement::new("b", ElementKind::Button)
        .with_content("label", "Go")
        .with_content("href", "javascript:alert(1)")]);
    assert!(html.contains("href=\"#\""));
}

#[test]
fn test_links_with_disguised_schemes_are_neutralised() {
    for href in [
        "java\tscript:alert(1)",
        "\u{1} JAVASCRIPT:alert(1)",
        "&#106;avascript:alert(1)",
        "data:text/html,x",
    ] {
        let html = publish(&[PageElement::new("b", ElementKind::Button)
            .with_content("label", "Go")
            .with_content("href", href)]);
        assert!(html.contains("href=\"#\""), "{} -> {}", href, html);
    }

    let image = publish(&[PageElement::new("i", ElementKind::Image)
        .with_content("src", "/uploads/a.png")]);
    assert!(image.contains("src=\"/uploads/a.png\""));
}

#[test]
fn test_text_markup_attribute_tricks_are_stripped() {
    let html = publish(&[PageElement::new("t", ElementKind::Text).with_content(
        "text",
        "<svg/onload=alert(1)><img src=\"x\"/onerror=\"alert(1)\"><a href=\"&#106;avascript:alert(1)\">x</a>",
    )]);
    assert!(!html.contains("onload"));
    assert!(!html.contains("onerror"));
    assert!(!html.contains("avascript"));
}
