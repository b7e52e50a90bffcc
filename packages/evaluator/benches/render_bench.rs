use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marble_evaluator::{render_canvas, to_html, Canvas, Device, HtmlOptions};
use marble_model::element::COLUMN_INDEX_KEY;
use marble_model::{find_widget, PageElement};

fn build_page(sections: usize) -> Vec<PageElement> {
    let section = find_widget("section").expect("section widget");
    let quote = find_widget("quote").expect("quote widget");
    let text = find_widget("text").expect("text widget");

    (0..sections)
        .map(|i| {
            let mut el = section.instantiate(format!("section-{}", i));
            el.content.insert("columns".into(), 3.into());
            for col in 0..3 {
                let child = if col % 2 == 0 { quote } else { text };
                el = el.with_child(
                    child
                        .instantiate(format!("child-{}-{}", i, col))
                        .with_content(COLUMN_INDEX_KEY, col),
                );
            }
            el
        })
        .collect()
}

fn render_editing_canvas(c: &mut Criterion) {
    let page = build_page(20);
    c.bench_function("render_editing_canvas", |b| {
        b.iter(|| render_canvas(black_box(&page), Some("child-3-1"), Device::Desktop))
    });
}

fn render_published_html(c: &mut Criterion) {
    let page = build_page(20);
    let options = HtmlOptions::compact();
    c.bench_function("render_published_html", |b| {
        b.iter(|| {
            let node = Canvas::published(Device::Mobile).render(black_box(&page));
            to_html(&node, &options)
        })
    });
}

criterion_group!(benches, render_editing_canvas, render_published_html);
criterion_main!(benches);
