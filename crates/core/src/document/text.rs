//! Plain-text extraction for listings and feed descriptions.
//!
//! Code blocks and images contribute no text. Block boundaries and hard breaks become a single
//! space, and runs of whitespace are collapsed.

use super::model::{Document, Node};
use crate::constants::WORDS_PER_MINUTE;

/// The document's prose as a single line of text.
pub fn plain_text(document: &Document) -> String {
    let mut raw = String::new();
    for node in &document.content {
        collect(&mut raw, node);
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect(out: &mut String, node: &Node) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::HardBreak | Node::HorizontalRule => out.push(' '),
        Node::CodeBlock { .. } | Node::Image { .. } => {}
        Node::Paragraph { children }
        | Node::Heading { children, .. }
        | Node::ListItem { children }
        | Node::Blockquote { children } => {
            out.push(' ');
            children.iter().for_each(|c| collect(out, c));
            out.push(' ');
        }
        Node::BulletList { items } | Node::OrderedList { items, .. } => {
            items.iter().for_each(|c| collect(out, c));
        }
        Node::Unknown { text, children, .. } => {
            if let Some(text) = text {
                out.push_str(text);
            }
            children.iter().for_each(|c| collect(out, c));
        }
    }
}

/// Number of whitespace-separated words of prose.
pub fn word_count(document: &Document) -> usize {
    plain_text(document).split_whitespace().count()
}

/// The first `max_chars` characters of prose, cut on a word boundary and ending in `…` when
/// truncated.
///
/// A single word longer than `max_chars` is cut mid-word.
pub fn excerpt(document: &Document, max_chars: usize) -> String {
    let text = plain_text(document);
    if text.chars().count() <= max_chars {
        return text;
    }

    // Leave room for the ellipsis.
    let budget = max_chars.saturating_sub(1);
    let cut = text
        .char_indices()
        .nth(budget)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..cut];

    let at_boundary = text[cut..].starts_with(char::is_whitespace);
    let head = if at_boundary {
        head.trim_end()
    } else {
        match head.rfind(' ') {
            Some(space) if space > 0 => &head[..space],
            _ => head,
        }
    };

    let mut out = head
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '.' | '-'))
        .to_string();
    out.push('\u{2026}');
    out
}

/// Estimated reading time in whole minutes, never less than one.
pub fn reading_time_minutes(document: &Document) -> u32 {
    let words = word_count(document);
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(&value, 16).expect("valid document")
    }

    fn words(n: usize) -> Document {
        let text = vec!["word"; n].join(" ");
        doc(json!({"type": "paragraph", "content": [{"type": "text", "text": text}]}))
    }

    #[test]
    fn blocks_are_separated_and_code_is_skipped() {
        let d = doc(json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Title"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "First"}, {"type": "hardBreak"}, {"type": "text", "text": "line"}]},
                {"type": "codeBlock", "content": [{"type": "text", "text": "let x = 1;"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "  end  "}]}
            ]
        }));
        assert_eq!(plain_text(&d), "Title First line end");
        assert_eq!(word_count(&d), 4);
    }

    #[test]
    fn short_text_is_not_truncated() {
        let d = words(3);
        assert_eq!(excerpt(&d, 160), "word word word");
    }

    #[test]
    fn excerpt_cuts_on_word_boundary() {
        let d = doc(json!({"type": "paragraph", "content": [{"type": "text", "text": "alpha beta gamma delta"}]}));
        assert_eq!(excerpt(&d, 13), "alpha beta\u{2026}");
        assert!(excerpt(&d, 13).chars().count() <= 13);
    }

    #[test]
    fn excerpt_keeps_word_ending_at_cut() {
        let d = doc(json!({"type": "paragraph", "content": [{"type": "text", "text": "alpha beta gamma"}]}));
        assert_eq!(excerpt(&d, 11), "alpha beta\u{2026}");
    }

    #[test]
    fn excerpt_cuts_long_word() {
        let d = doc(json!({"type": "paragraph", "content": [{"type": "text", "text": "supercalifragilistic"}]}));
        assert_eq!(excerpt(&d, 6), "super\u{2026}");
    }

    #[test]
    fn reading_time_rounds_up_with_minimum() {
        assert_eq!(reading_time_minutes(&Document::default()), 1);
        assert_eq!(reading_time_minutes(&words(200)), 1);
        assert_eq!(reading_time_minutes(&words(201)), 2);
    }
}
