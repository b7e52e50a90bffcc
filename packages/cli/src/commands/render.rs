use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use marble_common::Config;
use marble_evaluator::{to_html, Canvas, Device, HtmlOptions, MarkupPolicy};
use marble_model::decode_elements;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page JSON: a stored document or a bare element array
    #[arg(short, long)]
    pub input: PathBuf,

    /// Device preset (desktop, tablet, mobile)
    #[arg(short, long, default_value = "desktop")]
    pub device: String,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compact output without indentation
    #[arg(long)]
    pub compact: bool,
}

/// Render page JSON to published HTML
pub fn render_page(json: &str, device: Device, markup: MarkupPolicy, options: &HtmlOptions) -> Result<String> {
    let value: Value = serde_json::from_str(json).context("input is not valid JSON")?;
    let content = match value {
        Value::Object(mut document) => document.remove("content").unwrap_or(Value::Null),
        other => other,
    };

    let decoded = decode_elements(content);
    if decoded.malformed {
        tracing::warn!("page content is not a sequence, rendering an empty page");
    }
    let node = Canvas::published(device)
        .with_markup_policy(markup)
        .render(&decoded.elements);
    Ok(to_html(&node, options))
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let device: Device = args
        .device
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid device: {}. Use: desktop, tablet, or mobile", args.device))?;
    let options = if args.compact {
        HtmlOptions::compact()
    } else {
        HtmlOptions::default()
    };

    let input = cwd.join(&args.input);
    let json = std::fs::read_to_string(&input)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let markup = MarkupPolicy::from_sanitize_flag(config.builder.sanitize_markup);
    let html = render_page(&json, device, markup, &options)?;

    match args.output {
        Some(output) => {
            let output = cwd.join(output);
            std::fs::write(&output, html)?;
            eprintln!("  {} {} → {}", "✓".green(), args.input.display(), output.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_document_and_bare_array() {
        let document = r#"{
            "slug": "home",
            "title": "Home",
            "content": [{ "id": "q", "type": "quote", "content": { "text": "Stone", "author": "A" } }],
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let bare = r#"[{ "id": "q", "type": "quote", "content": { "text": "Stone", "author": "A" } }]"#;

        let options = HtmlOptions::compact();
        let a = render_page(document, Device::Desktop, MarkupPolicy::Sanitized, &options).unwrap();
        let b = render_page(bare, Device::Desktop, MarkupPolicy::Sanitized, &options).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("Stone"));
        assert!(a.contains("pb-page"));
    }

    #[test]
    fn test_render_malformed_is_empty_page() {
        let html = render_page(r#"{ "content": 5 }"#, Device::Mobile, MarkupPolicy::Sanitized, &HtmlOptions::compact())
            .unwrap();
        assert!(html.contains("pb-page"));
        assert!(!html.contains("pb-quote"));
    }

    #[test]
    fn test_render_rejects_bad_json() {
        assert!(render_page("not json", Device::Desktop, MarkupPolicy::Sanitized, &HtmlOptions::compact()).is_err());
    }
}
