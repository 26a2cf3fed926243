//! Structured document model and wire translation.
//!
//! Documents are stored as the editor's JSON tree: every node has a `type`, and may carry
//! `attrs`, `content` (child nodes), `marks` (inline formatting) and `text`.
//!
//! Responsibilities:
//! - Define a permissive wire model that accepts any node or mark type
//! - Translate the wire model into the closed [`Node`] / [`Mark`] sum types
//! - Keep unknown node and mark types as explicit fallback variants
//! - Enforce the configured nesting limit

use super::RenderFailure;
use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================================
// Public domain-level types
// ============================================================================

/// A parsed structured document. The root `doc` node is implicit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub content: Vec<Node>,
}

/// Heading level, always within `1..=6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Clamps any stored level into the valid range. Missing levels default to 1.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(1, 6) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Block and inline nodes of the editor's closed vocabulary.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        level: HeadingLevel,
        children: Vec<Node>,
    },
    BulletList {
        items: Vec<Node>,
    },
    OrderedList {
        start: u32,
        items: Vec<Node>,
    },
    ListItem {
        children: Vec<Node>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Blockquote {
        children: Vec<Node>,
    },
    Image {
        src: String,
        alt: Option<String>,
        title: Option<String>,
    },
    HorizontalRule,
    HardBreak,
    Text {
        text: String,
        marks: Vec<Mark>,
    },
    /// A node type this renderer does not know. Its text and children are kept so that content
    /// written by a newer editor degrades to plain output instead of disappearing.
    Unknown {
        kind: String,
        text: Option<String>,
        children: Vec<Node>,
    },
}

/// Inline formatting applied to a text run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    Underline,
    Code,
    Link { href: String, target: Option<String> },
    TextColor { color: String },
    Unknown(String),
}

impl Document {
    /// Translates a stored JSON tree into a [`Document`].
    ///
    /// The root is normally a `doc` node; any other root node is treated as the single child of
    /// an implicit document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderFailure`] if:
    /// - the value does not have the node shape (e.g. `content` is not an array),
    /// - the tree is nested deeper than `max_depth`.
    pub fn from_value(value: &Value, max_depth: usize) -> Result<Self, RenderFailure> {
        let wire = match serde_path_to_error::deserialize::<_, NodeWire>(value) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(RenderFailure::Malformed {
                    path,
                    reason: err.into_inner().to_string(),
                });
            }
        };

        if wire.kind == "doc" {
            let content = children_to_domain(wire.content, 1, max_depth)?;
            Ok(Document { content })
        } else {
            let node = wire_to_domain(wire, 1, max_depth)?;
            Ok(Document {
                content: vec![node],
            })
        }
    }

    /// Parses stored JSON text and translates it. See [`Document::from_value`].
    pub fn from_json_str(json: &str, max_depth: usize) -> Result<Self, RenderFailure> {
        let value: Value = serde_json::from_str(json).map_err(|e| RenderFailure::Malformed {
            path: "<root>".into(),
            reason: e.to_string(),
        })?;
        Self::from_value(&value, max_depth)
    }
}

// ============================================================================
// Wire model
// ============================================================================

#[derive(Debug, Deserialize)]
struct NodeWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attrs: Option<Map<String, Value>>,
    #[serde(default)]
    content: Option<Vec<NodeWire>>,
    #[serde(default)]
    marks: Option<Vec<MarkWire>>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarkWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attrs: Option<Map<String, Value>>,
}

// ============================================================================
// Translation helpers
// ============================================================================

fn children_to_domain(
    content: Option<Vec<NodeWire>>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<Node>, RenderFailure> {
    content
        .unwrap_or_default()
        .into_iter()
        .map(|child| wire_to_domain(child, depth + 1, max_depth))
        .collect()
}

fn wire_to_domain(wire: NodeWire, depth: usize, max_depth: usize) -> Result<Node, RenderFailure> {
    if depth > max_depth {
        return Err(RenderFailure::TooDeep { limit: max_depth });
    }

    let attrs = wire.attrs.unwrap_or_default();

    let node = match wire.kind.as_str() {
        "paragraph" => Node::Paragraph {
            children: children_to_domain(wire.content, depth, max_depth)?,
        },
        "heading" => Node::Heading {
            level: HeadingLevel::clamped(attr_i64(&attrs, "level").unwrap_or(1)),
            children: children_to_domain(wire.content, depth, max_depth)?,
        },
        "bulletList" => Node::BulletList {
            items: children_to_domain(wire.content, depth, max_depth)?,
        },
        "orderedList" => Node::OrderedList {
            start: attr_i64(&attrs, "start")
                .and_then(|s| u32::try_from(s).ok())
                .unwrap_or(1),
            items: children_to_domain(wire.content, depth, max_depth)?,
        },
        "listItem" => Node::ListItem {
            children: children_to_domain(wire.content, depth, max_depth)?,
        },
        "codeBlock" => Node::CodeBlock {
            language: attr_str(&attrs, "language"),
            code: collect_text(wire.content),
        },
        "blockquote" => Node::Blockquote {
            children: children_to_domain(wire.content, depth, max_depth)?,
        },
        "image" => Node::Image {
            src: attr_str(&attrs, "src").unwrap_or_default(),
            alt: attr_str(&attrs, "alt"),
            title: attr_str(&attrs, "title"),
        },
        "horizontalRule" => Node::HorizontalRule,
        "hardBreak" => Node::HardBreak,
        "text" => Node::Text {
            text: wire.text.unwrap_or_default(),
            marks: wire
                .marks
                .unwrap_or_default()
                .into_iter()
                .filter_map(mark_to_domain)
                .collect(),
        },
        _ => Node::Unknown {
            children: children_to_domain(wire.content, depth, max_depth)?,
            text: wire.text,
            kind: wire.kind.clone(),
        },
    };

    Ok(node)
}

fn mark_to_domain(wire: MarkWire) -> Option<Mark> {
    let attrs = wire.attrs.unwrap_or_default();

    let mark = match wire.kind.as_str() {
        "bold" => Mark::Bold,
        "italic" => Mark::Italic,
        "strike" => Mark::Strike,
        "underline" => Mark::Underline,
        "code" => Mark::Code,
        "link" => Mark::Link {
            href: attr_str(&attrs, "href").unwrap_or_default(),
            target: attr_str(&attrs, "target"),
        },
        // Text style without a color carries no formatting of its own.
        "textStyle" => Mark::TextColor {
            color: attr_str(&attrs, "color")?,
        },
        _ => Mark::Unknown(wire.kind.clone()),
    };

    Some(mark)
}

/// Concatenates the text of a code block's children. Code blocks hold plain text runs only.
fn collect_text(content: Option<Vec<NodeWire>>) -> String {
    let mut out = String::new();
    for child in content.unwrap_or_default() {
        if let Some(text) = child.text {
            out.push_str(&text);
        } else if child.kind == "hardBreak" {
            out.push('\n');
        }
    }
    out
}

fn attr_str(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn attr_i64(attrs: &Map<String, Value>, key: &str) -> Option<i64> {
    match attrs.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_heading_with_text() {
        let doc = Document::from_value(
            &json!({
                "type": "doc",
                "content": [
                    {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Hi"}]}
                ]
            }),
            8,
        )
        .expect("parse");

        assert_eq!(
            doc.content,
            vec![Node::Heading {
                level: HeadingLevel::clamped(2),
                children: vec![Node::Text {
                    text: "Hi".into(),
                    marks: vec![]
                }],
            }]
        );
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(HeadingLevel::clamped(9).get(), 6);
        assert_eq!(HeadingLevel::clamped(0).get(), 1);
        assert_eq!(HeadingLevel::clamped(-3).get(), 1);
    }

    #[test]
    fn unknown_types_are_preserved() {
        let doc = Document::from_value(
            &json!({
                "type": "doc",
                "content": [{"type": "callout", "content": [{"type": "text", "text": "note", "marks": [{"type": "sparkle"}]}]}]
            }),
            8,
        )
        .expect("parse");

        let Node::Unknown { kind, children, .. } = &doc.content[0] else {
            panic!("expected unknown node");
        };
        assert_eq!(kind, "callout");
        assert_eq!(
            children[0],
            Node::Text {
                text: "note".into(),
                marks: vec![Mark::Unknown("sparkle".into())]
            }
        );
    }

    #[test]
    fn text_style_without_color_is_dropped() {
        let doc = Document::from_value(
            &json!({"type": "text", "text": "x", "marks": [{"type": "textStyle", "attrs": {"color": null}}]}),
            8,
        )
        .expect("parse");
        assert_eq!(
            doc.content,
            vec![Node::Text {
                text: "x".into(),
                marks: vec![]
            }]
        );
    }

    #[test]
    fn malformed_content_reports_path() {
        let err = Document::from_value(
            &json!({"type": "doc", "content": [{"type": "paragraph", "content": "oops"}]}),
            8,
        )
        .expect_err("content must be an array");

        let RenderFailure::Malformed { path, .. } = err else {
            panic!("expected malformed failure");
        };
        assert_eq!(path, "content[0].content");
    }

    #[test]
    fn missing_type_is_malformed() {
        let err = Document::from_value(&json!({"content": []}), 8).expect_err("no type");
        assert!(matches!(err, RenderFailure::Malformed { .. }));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut value = json!({"type": "text", "text": "deep"});
        for _ in 0..10 {
            value = json!({"type": "blockquote", "content": [value]});
        }
        let doc = json!({"type": "doc", "content": [value]});

        assert!(Document::from_value(&doc, 16).is_ok());
        let err = Document::from_value(&doc, 5).expect_err("too deep");
        assert!(matches!(err, RenderFailure::TooDeep { limit: 5 }));
    }

    #[test]
    fn code_block_collects_text_and_language() {
        let doc = Document::from_json_str(
            r#"{"type":"doc","content":[{"type":"codeBlock","attrs":{"language":"rust"},"content":[{"type":"text","text":"fn main() {}"}]}]}"#,
            8,
        )
        .expect("parse");

        assert_eq!(
            doc.content,
            vec![Node::CodeBlock {
                language: Some("rust".into()),
                code: "fn main() {}".into()
            }]
        );
    }

    #[test]
    fn ordered_list_start_defaults_to_one() {
        let doc = Document::from_value(
            &json!({"type": "orderedList", "attrs": {"start": "x"}, "content": []}),
            8,
        )
        .expect("parse");
        assert_eq!(
            doc.content,
            vec![Node::OrderedList {
                start: 1,
                items: vec![]
            }]
        );
    }
}
