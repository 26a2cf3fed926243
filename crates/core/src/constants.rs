//! Constants used throughout the masthead core crate.
//!
//! Fallback fragments and stylesheet class names are part of the public contract: the public
//! site's stylesheet targets them and cached pages may already contain them.

/// Returned by the renderer when the stored body is neither a document nor legacy HTML.
pub const CONTENT_UNAVAILABLE_HTML: &str = r#"<p class="text-node">Content unavailable</p>"#;

/// Returned by the renderer when a document could not be walked.
pub const RENDER_FAILED_HTML: &str = r#"<p class="text-node">Error rendering content</p>"#;

/// Class applied to `<h1>`..`<h6>`.
pub const HEADING_CLASS: &str = "heading-node";

/// Class applied to `<ul>` and `<ol>`.
pub const LIST_CLASS: &str = "list-node";

/// Class applied to `<p>`.
pub const PARAGRAPH_CLASS: &str = "text-node";

/// Class applied to `<blockquote>`.
pub const BLOCK_CLASS: &str = "block-node";

/// Class applied to inline `<code>`.
pub const INLINE_CODE_CLASS: &str = "inline";

/// Class applied to `<a>`.
pub const LINK_CLASS: &str = "link";

/// `rel` attribute carried by every rendered link.
pub const LINK_REL: &str = "noopener noreferrer nofollow";

/// Default nesting limit for stored documents.
pub const DEFAULT_MAX_DOCUMENT_DEPTH: usize = 64;

/// Upper bound accepted for a configured nesting limit.
pub const MAX_DOCUMENT_DEPTH_LIMIT: usize = 512;

/// Default excerpt length, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 160;

/// Smallest excerpt length a deployment may configure.
pub const MIN_EXCERPT_CHARS: usize = 16;

/// Reading speed used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
