//! Article service and related types.
//!
//! This module turns a submitted admin form into a validated [`PreparedArticle`]: the title,
//! slug and association rows are checked, and the body is parsed and pre-rendered. The result is
//! handed to the storage collaborator as-is.

use crate::associations::{primary_of, Association, AssociationKind, Selection};
use crate::document::{self, Document, RenderedHtml};
use crate::{ArticleError, ArticleResult, CoreConfig, EntityId, NonEmptyText, Slug};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Publication state of an article.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

/// An article as submitted by the admin form.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    pub title: String,
    /// Explicit slug. When absent or blank the slug is derived from the title.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authors: Selection,
    #[serde(default)]
    pub categories: Selection,
    #[serde(default)]
    pub tags: Selection,
    /// The editor's document tree. `null` is an empty body.
    #[serde(default)]
    pub body: Value,
}

/// A validated article, ready to persist.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedArticle {
    pub title: NonEmptyText,
    pub slug: Slug,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub authors: Vec<Association>,
    pub categories: Vec<Association>,
    pub tags: Vec<Association>,
    pub body: Value,
    pub html: RenderedHtml,
    pub excerpt: String,
    pub word_count: usize,
    pub reading_time_minutes: u32,
}

impl PreparedArticle {
    /// The author shown in the byline.
    pub fn primary_author(&self) -> Option<&EntityId> {
        primary_of(&self.authors)
    }

    /// The category shown in the breadcrumb.
    pub fn primary_category(&self) -> Option<&EntityId> {
        primary_of(&self.categories)
    }
}

/// Pure article operations - no storage concerns
#[derive(Clone)]
pub struct ArticleService {
    cfg: Arc<CoreConfig>,
}

impl ArticleService {
    /// Creates a new instance of ArticleService.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Validates and assembles a submitted draft, using the current time for a newly published
    /// article. See [`ArticleService::prepare_at`].
    pub fn prepare(&self, draft: ArticleDraft) -> ArticleResult<PreparedArticle> {
        self.prepare_at(draft, Utc::now())
    }

    /// Validates and assembles a submitted draft.
    ///
    /// A published article without a publication time is stamped with `now`; drafts carry no
    /// publication time.
    ///
    /// # Errors
    ///
    /// Returns an `ArticleError` if:
    /// - the title is blank, or the explicit slug is malformed,
    /// - no slug can be derived from the title,
    /// - a selection violates the configured primary policy,
    /// - the body is not a document, or is malformed or too deeply nested.
    pub fn prepare_at(
        &self,
        draft: ArticleDraft,
        now: DateTime<Utc>,
    ) -> ArticleResult<PreparedArticle> {
        let title = NonEmptyText::new(&draft.title).map_err(|source| ArticleError::InvalidText {
            field: "title",
            source,
        })?;

        let slug = match draft.slug.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => Slug::new(explicit),
            _ => Slug::from_title(title.as_str()),
        }
        .map_err(|source| ArticleError::InvalidText {
            field: "slug",
            source,
        })?;

        let policy = self.cfg.primary_policy();
        let authors = draft.authors.normalize(AssociationKind::Author, policy)?;
        let categories = draft
            .categories
            .normalize(AssociationKind::Category, policy)?;
        let tags = draft.tags.normalize(AssociationKind::Tag, policy)?;

        let (doc, body) = match draft.body {
            Value::Null => (Document::default(), json!({"type": "doc", "content": []})),
            body @ Value::Object(_) => (
                Document::from_value(&body, self.cfg.max_document_depth())?,
                body,
            ),
            _ => {
                return Err(ArticleError::InvalidInput(
                    "body must be a structured document".into(),
                ))
            }
        };

        let published_at = match draft.status {
            ArticleStatus::Published => Some(draft.published_at.unwrap_or(now)),
            ArticleStatus::Draft => None,
        };

        let prepared = PreparedArticle {
            html: document::render_document(&doc),
            excerpt: document::excerpt(&doc, self.cfg.excerpt_chars()),
            word_count: document::word_count(&doc),
            reading_time_minutes: document::reading_time_minutes(&doc),
            title,
            slug,
            status: draft.status,
            published_at,
            authors,
            categories,
            tags,
            body,
        };

        tracing::debug!(
            slug = %prepared.slug,
            status = ?prepared.status,
            words = prepared.word_count,
            "prepared article"
        );

        Ok(prepared)
    }

    /// Renders a stored body with the configured nesting limit. Never fails.
    pub fn render_body(&self, body: &Value) -> RenderedHtml {
        document::render_with_limit(body, self.cfg.max_document_depth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::associations::PrimaryPolicy;
    use chrono::TimeZone;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).expect("valid id")
    }

    fn service(policy: PrimaryPolicy) -> ArticleService {
        ArticleService::new(Arc::new(
            CoreConfig::new(policy, 16, 40).expect("valid config"),
        ))
    }

    fn draft() -> ArticleDraft {
        ArticleDraft {
            title: "  Hello, World!  ".into(),
            categories: Selection::new(vec![id("news"), id("tech")], Some(id("tech"))),
            tags: Selection::new(vec![id("a"), id("b"), id("a")], None),
            body: json!({
                "type": "doc",
                "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Body text"}]}]
            }),
            ..ArticleDraft::default()
        }
    }

    #[test]
    fn prepares_valid_draft() {
        let prepared = service(PrimaryPolicy::default())
            .prepare(draft())
            .expect("valid draft");

        assert_eq!(prepared.title.as_str(), "Hello, World!");
        assert_eq!(prepared.slug.as_str(), "hello-world");
        assert_eq!(prepared.primary_category(), Some(&id("tech")));
        assert_eq!(prepared.primary_author(), None);
        assert_eq!(prepared.tags.len(), 2);
        assert_eq!(
            prepared.html.as_str(),
            "<p class=\"text-node\">Body text</p>"
        );
        assert_eq!(prepared.excerpt, "Body text");
        assert_eq!(prepared.word_count, 2);
        assert_eq!(prepared.reading_time_minutes, 1);
        assert_eq!(prepared.status, ArticleStatus::Draft);
        assert_eq!(prepared.published_at, None);
    }

    #[test]
    fn explicit_slug_is_validated() {
        let svc = service(PrimaryPolicy::default());

        let mut ok = draft();
        ok.slug = Some("custom-slug".into());
        assert_eq!(
            svc.prepare(ok).expect("valid slug").slug.as_str(),
            "custom-slug"
        );

        let mut bad = draft();
        bad.slug = Some("Not A Slug".into());
        let err = svc.prepare(bad).expect_err("invalid slug");
        assert!(matches!(err, ArticleError::InvalidText { field: "slug", .. }));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut d = draft();
        d.title = "   ".into();
        let err = service(PrimaryPolicy::default())
            .prepare(d)
            .expect_err("blank title");
        assert!(matches!(err, ArticleError::InvalidText { field: "title", .. }));
    }

    #[test]
    fn category_primary_is_required_by_default() {
        let mut d = draft();
        d.categories = Selection::new(vec![id("news")], None);
        let err = service(PrimaryPolicy::default())
            .prepare(d)
            .expect_err("missing primary");
        assert!(matches!(
            err,
            ArticleError::MissingPrimary {
                kind: AssociationKind::Category
            }
        ));

        let mut empty = draft();
        empty.categories = Selection::default();
        let err = service(PrimaryPolicy::default())
            .prepare(empty)
            .expect_err("no categories");
        assert!(matches!(err, ArticleError::EmptySelection { .. }));
    }

    #[test]
    fn optional_policy_accepts_missing_category() {
        let mut d = draft();
        d.categories = Selection::default();
        let prepared = service(PrimaryPolicy::Optional)
            .prepare(d)
            .expect("optional categories");
        assert!(prepared.categories.is_empty());
    }

    #[test]
    fn body_must_be_a_document() {
        let svc = service(PrimaryPolicy::default());

        let mut legacy = draft();
        legacy.body = json!("<p>legacy</p>");
        assert!(matches!(
            svc.prepare(legacy),
            Err(ArticleError::InvalidInput(_))
        ));

        let mut malformed = draft();
        malformed.body = json!({"type": "doc", "content": 3});
        assert!(matches!(
            svc.prepare(malformed),
            Err(ArticleError::InvalidBody(_))
        ));

        let mut empty = draft();
        empty.body = Value::Null;
        let prepared = svc.prepare(empty).expect("null body");
        assert_eq!(prepared.html.as_str(), "");
        assert_eq!(prepared.body, json!({"type": "doc", "content": []}));
    }

    #[test]
    fn publishing_stamps_time() {
        let svc = service(PrimaryPolicy::default());
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let mut d = draft();
        d.status = ArticleStatus::Published;
        let prepared = svc.prepare_at(d, now).expect("published");
        assert_eq!(prepared.published_at, Some(now));

        let earlier = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let mut d = draft();
        d.status = ArticleStatus::Published;
        d.published_at = Some(earlier);
        let prepared = svc.prepare_at(d, now).expect("published");
        assert_eq!(prepared.published_at, Some(earlier));
    }

    #[test]
    fn render_body_uses_configured_depth() {
        let svc = service(PrimaryPolicy::default());
        let mut value = json!({"type": "text", "text": "x"});
        for _ in 0..20 {
            value = json!({"type": "blockquote", "content": [value]});
        }
        assert_eq!(
            svc.render_body(&value).as_str(),
            crate::constants::RENDER_FAILED_HTML
        );
    }

    #[test]
    fn draft_deserializes_from_form_json() {
        let d: ArticleDraft = serde_json::from_value(json!({
            "title": "T",
            "status": "published",
            "categories": {"selectedIds": ["c1"], "primaryId": "c1"}
        }))
        .expect("draft json");
        assert_eq!(d.status, ArticleStatus::Published);
        assert_eq!(d.categories.primary_id, Some(id("c1")));
        assert_eq!(d.body, Value::Null);
    }
}
