use std::fmt::Write;

use super::PreviewBundle;

/// Meta tags emitted into the HTML document, as (attribute, key) pairs.
const HEAD_TAGS: &[(&str, &str)] = &[
    ("name", "description"),
    ("property", "og:title"),
    ("property", "og:description"),
    ("property", "og:image"),
    ("property", "og:url"),
    ("property", "og:type"),
    ("property", "og:site_name"),
    ("name", "twitter:card"),
    ("name", "twitter:title"),
    ("name", "twitter:description"),
    ("name", "twitter:image"),
    ("name", "twitter:creator"),
];

/// Minimal HTML page carrying the bundle's meta tags, for link scrapers.
pub fn render_html(bundle: &PreviewBundle) -> String {
    let tag = |key: &str| meta_tag(bundle, key);

    let mut out = String::with_capacity(2048);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\" />\n");
    let _ = writeln!(out, "  <title>{}</title>", escape(tag("title")));
    for &(attr, key) in HEAD_TAGS {
        let _ = writeln!(
            out,
            "  <meta {attr}=\"{key}\" content=\"{}\" />",
            escape(tag(key))
        );
    }
    let _ = writeln!(
        out,
        "  <script type=\"application/ld+json\">{}</script>",
        serde_json::to_string(&bundle.structured_data)
            .unwrap_or_default()
            .replace("</", "<\\/")
    );
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "  <h1>{}</h1>", escape(&bundle.preview.title));
    let _ = writeln!(out, "  <p>{}</p>", escape(&bundle.preview.description));
    out.push_str("</body>\n</html>\n");
    out
}

fn meta_tag<'a>(bundle: &'a PreviewBundle, key: &str) -> &'a str {
    bundle.meta_tags.get(key).map(String::as_str).unwrap_or("")
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
