//! Structured document rendering.
//!
//! Article bodies are stored as the rich-text editor's JSON tree and rendered to HTML on read,
//! both for the admin preview and for the public article page.
//!
//! - [`model`]: wire translation into the closed [`Node`] / [`Mark`] vocabulary
//! - [`render`]: node-to-HTML mapping and the never-failing [`render()`] entry point
//! - [`highlight`]: memoized syntax-highlighting grammars for code blocks
//! - [`typography`]: typographic substitutions for prose text runs
//! - [`text`]: plain-text extraction for excerpts and reading time
//!
//! Rendering never propagates an error to page delivery: malformed input degrades to a fixed
//! fallback fragment and the failure is logged.

pub mod highlight;
pub mod model;
pub mod render;
pub mod text;
pub mod typography;

use serde::Serialize;
use std::fmt;

pub use highlight::FormattingRuleset;
pub use model::{Document, HeadingLevel, Mark, Node};
pub use render::{render, render_document, render_json_str, render_with_limit, try_render};
pub use text::{excerpt, plain_text, reading_time_minutes, word_count};

/// Why a document could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderFailure {
    #[error("malformed document at {path}: {reason}")]
    Malformed { path: String, reason: String },
    #[error("document exceeds maximum nesting depth of {limit}")]
    TooDeep { limit: usize },
}

/// An HTML fragment produced by the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedHtml(String);

impl RenderedHtml {
    pub(crate) fn new(html: String) -> Self {
        Self(html)
    }

    /// The fragment returned when stored content is absent or of the wrong type.
    pub fn unavailable() -> Self {
        Self(crate::constants::CONTENT_UNAVAILABLE_HTML.to_owned())
    }

    /// The fragment returned when a document could not be rendered.
    pub fn render_failed() -> Self {
        Self(crate::constants::RENDER_FAILED_HTML.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RenderedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds the formatting ruleset ahead of the first request.
///
/// Rendering works without this; it only moves the one-time grammar compilation to startup.
pub fn warm_up() -> usize {
    FormattingRuleset::global().len()
}
