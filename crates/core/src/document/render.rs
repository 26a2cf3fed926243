//! Node-to-HTML mapping.
//!
//! The class names emitted here are targeted by the public site's stylesheet and must not
//! change. Every text and attribute value passes through [`escape_html`].

use super::highlight::FormattingRuleset;
use super::model::{Document, Mark, Node};
use super::typography;
use super::{RenderFailure, RenderedHtml};
use crate::constants::{
    BLOCK_CLASS, DEFAULT_MAX_DOCUMENT_DEPTH, HEADING_CLASS, INLINE_CODE_CLASS, LINK_CLASS,
    LINK_REL, LIST_CLASS, PARAGRAPH_CLASS,
};
use crate::validation::{safe_color, safe_language_tag, safe_url};
use serde_json::Value;
use std::borrow::Cow;

/// Renders a stored body with the default nesting limit. Never fails.
///
/// - a string is legacy, already-rendered HTML and is returned unchanged
/// - an object is rendered as a document; failures yield the "error rendering" fragment
/// - anything else yields the "content unavailable" fragment
pub fn render(value: &Value) -> RenderedHtml {
    render_with_limit(value, DEFAULT_MAX_DOCUMENT_DEPTH)
}

/// [`render`] with an explicit nesting limit.
pub fn render_with_limit(value: &Value, max_depth: usize) -> RenderedHtml {
    match value {
        Value::String(legacy) => RenderedHtml::new(legacy.clone()),
        Value::Object(_) => match try_render(value, max_depth) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, "document render degraded to fallback");
                RenderedHtml::render_failed()
            }
        },
        _ => RenderedHtml::unavailable(),
    }
}

/// Parses and renders a document, reporting why it could not be rendered.
pub fn try_render(value: &Value, max_depth: usize) -> Result<RenderedHtml, RenderFailure> {
    let document = Document::from_value(value, max_depth)?;
    Ok(render_document(&document))
}

/// Renders stored JSON text with the given nesting limit. Text that is not valid JSON yields the
/// "error rendering" fragment.
pub fn render_json_str(json: &str, max_depth: usize) -> RenderedHtml {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => render_with_limit(&value, max_depth),
        Err(e) => {
            tracing::warn!(error = %e, "stored document is not valid JSON");
            RenderedHtml::render_failed()
        }
    }
}

/// Renders an already-parsed document.
pub fn render_document(document: &Document) -> RenderedHtml {
    let mut out = String::new();
    let ruleset = FormattingRuleset::global();
    for node in &document.content {
        write_node(&mut out, node, ruleset);
    }
    RenderedHtml::new(out)
}

/// Escapes the five HTML-significant characters. Borrows when nothing needs escaping.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Writes sibling nodes. Adjacent text runs share quote state, so a quote closed after a
/// marked run still closes.
fn write_children(out: &mut String, children: &[Node], ruleset: &FormattingRuleset) {
    let mut prev: Option<char> = None;
    for child in children {
        match child {
            Node::Text { text, marks } => prev = write_text(out, text, marks, prev),
            other => {
                write_node(out, other, ruleset);
                prev = None;
            }
        }
    }
}

fn write_node(out: &mut String, node: &Node, ruleset: &FormattingRuleset) {
    match node {
        Node::Paragraph { children } => {
            out.push_str(&format!("<p class=\"{}\">", PARAGRAPH_CLASS));
            write_children(out, children, ruleset);
            out.push_str("</p>");
        }
        Node::Heading { level, children } => {
            let level = level.get();
            out.push_str(&format!("<h{} class=\"{}\">", level, HEADING_CLASS));
            write_children(out, children, ruleset);
            out.push_str(&format!("</h{}>", level));
        }
        Node::BulletList { items } => {
            out.push_str(&format!("<ul class=\"{}\">", LIST_CLASS));
            write_children(out, items, ruleset);
            out.push_str("</ul>");
        }
        Node::OrderedList { start, items } => {
            if *start == 1 {
                out.push_str(&format!("<ol class=\"{}\">", LIST_CLASS));
            } else {
                out.push_str(&format!("<ol class=\"{}\" start=\"{}\">", LIST_CLASS, start));
            }
            write_children(out, items, ruleset);
            out.push_str("</ol>");
        }
        Node::ListItem { children } => {
            out.push_str("<li>");
            write_children(out, children, ruleset);
            out.push_str("</li>");
        }
        Node::CodeBlock { language, code } => write_code_block(out, language.as_deref(), code, ruleset),
        Node::Blockquote { children } => {
            out.push_str(&format!("<blockquote class=\"{}\">", BLOCK_CLASS));
            write_children(out, children, ruleset);
            out.push_str("</blockquote>");
        }
        Node::Image { src, alt, title } => {
            out.push_str("<img");
            if let Some(src) = safe_url(src) {
                out.push_str(&format!(" src=\"{}\"", escape_html(src)));
            }
            out.push_str(&format!(
                " alt=\"{}\"",
                escape_html(alt.as_deref().unwrap_or_default())
            ));
            if let Some(title) = title {
                out.push_str(&format!(" title=\"{}\"", escape_html(title)));
            }
            out.push('>');
        }
        Node::HorizontalRule => out.push_str("<hr>"),
        Node::HardBreak => out.push_str("<br>"),
        Node::Text { text, marks } => {
            write_text(out, text, marks, None);
        }
        Node::Unknown {
            kind,
            text,
            children,
        } => {
            tracing::debug!(kind = %kind, "rendering unknown node type without wrapper");
            if children.is_empty() {
                if let Some(text) = text {
                    out.push_str(&escape_html(&typography::apply(text)));
                }
            } else {
                write_children(out, children, ruleset);
            }
        }
    }
}

fn write_code_block(
    out: &mut String,
    language: Option<&str>,
    code: &str,
    ruleset: &FormattingRuleset,
) {
    let tag = language.and_then(safe_language_tag);

    match tag {
        Some(tag) => match ruleset.grammar(&tag) {
            Some(grammar) => {
                out.push_str(&format!("<pre><code class=\"hljs language-{}\">", tag));
                out.push_str(&grammar.highlight(code));
            }
            None => {
                out.push_str(&format!("<pre><code class=\"language-{}\">", tag));
                out.push_str(&escape_html(code));
            }
        },
        None => {
            out.push_str("<pre><code>");
            out.push_str(&escape_html(code));
        }
    }

    out.push_str("</code></pre>");
}

/// Writes a text run wrapped in its marks. The first mark is the outermost element.
///
/// `prev` is the last character of the preceding sibling run. Returns the last character of this
/// run for the next sibling.
fn write_text(out: &mut String, text: &str, marks: &[Mark], prev: Option<char>) -> Option<char> {
    let is_code = marks.iter().any(|m| matches!(m, Mark::Code));
    let prose = if is_code {
        Cow::Borrowed(text)
    } else {
        typography::apply_after(text, prev)
    };
    let last = prose.chars().last().or(prev);
    let body = escape_html(&prose).into_owned();

    let mut closers: Vec<&'static str> = Vec::with_capacity(marks.len());
    for mark in marks {
        if let Some(closer) = open_mark(out, mark) {
            closers.push(closer);
        }
    }

    out.push_str(&body);

    for closer in closers.iter().rev() {
        out.push_str(closer);
    }

    last
}

/// Writes the opening tag for a mark and returns its closing tag, or `None` if the mark renders
/// nothing.
fn open_mark(out: &mut String, mark: &Mark) -> Option<&'static str> {
    match mark {
        Mark::Bold => {
            out.push_str("<strong>");
            Some("</strong>")
        }
        Mark::Italic => {
            out.push_str("<em>");
            Some("</em>")
        }
        Mark::Strike => {
            out.push_str("<s>");
            Some("</s>")
        }
        Mark::Underline => {
            out.push_str("<u>");
            Some("</u>")
        }
        Mark::Code => {
            out.push_str(&format!(
                "<code class=\"{}\" spellcheck=\"false\">",
                INLINE_CODE_CLASS
            ));
            Some("</code>")
        }
        Mark::Link { href, target } => {
            out.push_str("<a");
            if let Some(href) = safe_url(href) {
                out.push_str(&format!(" href=\"{}\"", escape_html(href)));
            }
            let target = target.as_deref().unwrap_or("_blank");
            out.push_str(&format!(
                " target=\"{}\" rel=\"{}\" class=\"{}\">",
                escape_html(target),
                LINK_REL,
                LINK_CLASS
            ));
            Some("</a>")
        }
        Mark::TextColor { color } => {
            let color = safe_color(color)?;
            out.push_str(&format!("<span style=\"color: {}\">", escape_html(color)));
            Some("</span>")
        }
        Mark::Unknown(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CONTENT_UNAVAILABLE_HTML, RENDER_FAILED_HTML};
    use serde_json::json;

    fn paragraph(text: serde_json::Value) -> serde_json::Value {
        json!({"type": "doc", "content": [{"type": "paragraph", "content": [text]}]})
    }

    #[test]
    fn renders_heading_with_class() {
        let html = render(&json!({
            "type": "doc",
            "content": [{"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Hello"}]}]
        }));
        assert!(html.as_str().contains("<h1 class=\"heading-node\">Hello</h1>"));
    }

    #[test]
    fn legacy_string_is_returned_unchanged() {
        let legacy = "<p>already <b>rendered</b></p>";
        let once = render(&json!(legacy));
        assert_eq!(once.as_str(), legacy);
        assert_eq!(render(&json!(once.as_str())).as_str(), legacy);
    }

    #[test]
    fn non_documents_are_unavailable() {
        assert_eq!(render(&Value::Null).as_str(), CONTENT_UNAVAILABLE_HTML);
        assert_eq!(render(&json!(42)).as_str(), CONTENT_UNAVAILABLE_HTML);
        assert_eq!(render(&json!([1, 2])).as_str(), CONTENT_UNAVAILABLE_HTML);
        assert_eq!(render(&json!(true)).as_str(), CONTENT_UNAVAILABLE_HTML);
    }

    #[test]
    fn malformed_object_degrades_to_render_failed() {
        assert_eq!(render(&json!({"content": "nope"})).as_str(), RENDER_FAILED_HTML);
        assert_eq!(
            render_json_str("{not json", DEFAULT_MAX_DOCUMENT_DEPTH).as_str(),
            RENDER_FAILED_HTML
        );
    }

    #[test]
    fn too_deep_degrades_to_render_failed() {
        let mut value = json!({"type": "text", "text": "x"});
        for _ in 0..8 {
            value = json!({"type": "blockquote", "content": [value]});
        }
        assert_eq!(render_with_limit(&value, 4).as_str(), RENDER_FAILED_HTML);
        let stored = value.to_string();
        assert_eq!(render_json_str(&stored, 4).as_str(), RENDER_FAILED_HTML);
        assert!(render_json_str(&stored, 16).as_str().contains("<blockquote"));
        assert!(matches!(
            try_render(&value, 4),
            Err(RenderFailure::TooDeep { limit: 4 })
        ));
    }

    #[test]
    fn block_nodes_carry_stylesheet_classes() {
        let html = render(&json!({
            "type": "doc",
            "content": [
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "one"}]}]}
                ]},
                {"type": "orderedList", "attrs": {"start": 3}, "content": []},
                {"type": "blockquote", "content": []},
                {"type": "horizontalRule"}
            ]
        }));
        assert_eq!(
            html.as_str(),
            "<ul class=\"list-node\"><li><p class=\"text-node\">one</p></li></ul>\
             <ol class=\"list-node\" start=\"3\"></ol>\
             <blockquote class=\"block-node\"></blockquote><hr>"
        );
    }

    #[test]
    fn marks_nest_with_first_outermost() {
        let html = render(&paragraph(json!({
            "type": "text",
            "text": "hi",
            "marks": [{"type": "bold"}, {"type": "italic"}]
        })));
        assert_eq!(
            html.as_str(),
            "<p class=\"text-node\"><strong><em>hi</em></strong></p>"
        );
    }

    #[test]
    fn inline_code_disables_spellcheck_and_typography() {
        let html = render(&paragraph(json!({
            "type": "text",
            "text": "a -- b",
            "marks": [{"type": "code"}]
        })));
        assert_eq!(
            html.as_str(),
            "<p class=\"text-node\"><code class=\"inline\" spellcheck=\"false\">a -- b</code></p>"
        );
    }

    #[test]
    fn typography_applies_to_prose() {
        let html = render(&paragraph(json!({"type": "text", "text": "wait -- \"what\"..."})));
        assert_eq!(
            html.as_str(),
            "<p class=\"text-node\">wait \u{2014} \u{201C}what\u{201D}\u{2026}</p>"
        );
    }

    #[test]
    fn text_is_escaped() {
        let html = render(&paragraph(json!({"type": "text", "text": "<script>x</script> & co"})));
        assert_eq!(
            html.as_str(),
            "<p class=\"text-node\">&lt;script&gt;x&lt;/script&gt; &amp; co</p>"
        );
    }

    #[test]
    fn link_renders_with_class_and_rel() {
        let html = render(&paragraph(json!({
            "type": "text",
            "text": "site",
            "marks": [{"type": "link", "attrs": {"href": "https://example.com/?a=1&b=2"}}]
        })));
        assert_eq!(
            html.as_str(),
            "<p class=\"text-node\"><a href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\" \
             rel=\"noopener noreferrer nofollow\" class=\"link\">site</a></p>"
        );
    }

    #[test]
    fn script_href_is_dropped() {
        let html = render(&paragraph(json!({
            "type": "text",
            "text": "click",
            "marks": [{"type": "link", "attrs": {"href": "javascript:alert(1)"}}]
        })));
        assert!(!html.as_str().contains("href"));
        assert!(html.as_str().contains("class=\"link\">click</a>"));
    }

    #[test]
    fn text_color_is_validated() {
        let ok = render(&paragraph(json!({
            "type": "text",
            "text": "red",
            "marks": [{"type": "textStyle", "attrs": {"color": "#ff0000"}}]
        })));
        assert!(ok.as_str().contains("<span style=\"color: #ff0000\">red</span>"));

        let bad = render(&paragraph(json!({
            "type": "text",
            "text": "red",
            "marks": [{"type": "textStyle", "attrs": {"color": "red; background: url(x)"}}]
        })));
        assert_eq!(bad.as_str(), "<p class=\"text-node\">red</p>");
    }

    #[test]
    fn image_has_src_and_alt() {
        let html = render(&json!({
            "type": "image",
            "attrs": {"src": "/media/cat.png", "alt": "A \"cat\""}
        }));
        assert_eq!(
            html.as_str(),
            "<img src=\"/media/cat.png\" alt=\"A &quot;cat&quot;\">"
        );
    }

    #[test]
    fn code_block_highlighting() {
        let known = render(&json!({
            "type": "codeBlock",
            "attrs": {"language": "rust"},
            "content": [{"type": "text", "text": "let x = 1;"}]
        }));
        assert!(known
            .as_str()
            .starts_with("<pre><code class=\"hljs language-rust\"><span class=\"hljs-keyword\">let</span>"));

        let unknown = render(&json!({
            "type": "codeBlock",
            "attrs": {"language": "klingon"},
            "content": [{"type": "text", "text": "a < b"}]
        }));
        assert_eq!(
            unknown.as_str(),
            "<pre><code class=\"language-klingon\">a &lt; b</code></pre>"
        );

        let plain = render(&json!({
            "type": "codeBlock",
            "content": [{"type": "text", "text": "x -- y"}]
        }));
        assert_eq!(plain.as_str(), "<pre><code>x -- y</code></pre>");
    }

    #[test]
    fn unknown_nodes_render_children_without_wrapper() {
        let html = render(&json!({
            "type": "doc",
            "content": [{"type": "callout", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "note", "marks": [{"type": "sparkle"}]}]}
            ]}]
        }));
        assert_eq!(html.as_str(), "<p class=\"text-node\">note</p>");
    }

    #[test]
    fn heading_level_is_clamped_in_output() {
        let html = render(&json!({"type": "heading", "attrs": {"level": 9}, "content": []}));
        assert_eq!(html.as_str(), "<h6 class=\"heading-node\"></h6>");
    }

    #[test]
    fn quotes_close_across_marked_runs() {
        let html = render(&json!({"type": "paragraph", "content": [
            {"type": "text", "text": "say \""},
            {"type": "text", "text": "hi", "marks": [{"type": "bold"}]},
            {"type": "text", "text": "\" now"}
        ]}));
        assert_eq!(
            html.as_str(),
            "<p class=\"text-node\">say \u{201C}<strong>hi</strong>\u{201D} now</p>"
        );

        let html = render(&json!({"type": "heading", "attrs": {"level": 2}, "content": [
            {"type": "text", "text": "\"", "marks": [{"type": "italic"}]},
            {"type": "text", "text": "Dune", "marks": [{"type": "italic"}]},
            {"type": "text", "text": "\" reviewed"}
        ]}));
        assert_eq!(
            html.as_str(),
            "<h2 class=\"heading-node\"><em>\u{201C}</em><em>Dune</em>\u{201D} reviewed</h2>"
        );
    }

    #[test]
    fn hard_break_renders_br() {
        let html = render(&json!({"type": "paragraph", "content": [
            {"type": "text", "text": "a"}, {"type": "hardBreak"}, {"type": "text", "text": "b"}
        ]}));
        assert_eq!(html.as_str(), "<p class=\"text-node\">a<br>b</p>");
    }
}
