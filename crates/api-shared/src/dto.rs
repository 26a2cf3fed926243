//! Request and response types for the Masthead APIs.
//!
//! Wire types carry plain strings; conversion into validated core types happens here so the
//! REST handlers and the CLI report the same errors for the same input.

use chrono::{DateTime, Utc};
use masthead_core::{
    ArticleDraft, ArticleError, ArticleResult, ArticleStatus, Association, AssociationKind,
    EntityId, PreparedArticle, Selection,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// ============================================================================
// Health
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    /// Number of syntax-highlighting grammars loaded.
    pub languages: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RenderReq {
    /// Stored body: a document tree, or a legacy HTML string.
    #[schema(value_type = Object)]
    #[serde(default)]
    pub document: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RenderRes {
    pub html: String,
}

// ============================================================================
// Associations
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDto {
    #[serde(default)]
    pub selected_ids: Vec<String>,
    #[serde(default)]
    pub primary_id: Option<String>,
}

impl SelectionDto {
    /// Validates every identifier and builds the core selection.
    pub fn into_selection(self) -> ArticleResult<Selection> {
        let selected_ids = parse_ids("selectedIds", self.selected_ids)?;
        let primary_id = self
            .primary_id
            .map(|p| parse_id("primaryId", &p))
            .transpose()?;
        Ok(Selection::new(selected_ids, primary_id))
    }
}

impl From<&Selection> for SelectionDto {
    fn from(selection: &Selection) -> Self {
        Self {
            selected_ids: selection
                .selected_ids
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
            primary_id: selection.primary_id.as_ref().map(|id| id.as_str().to_owned()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRes {
    pub entity_id: String,
    pub is_primary: bool,
}

impl From<&Association> for AssociationRes {
    fn from(association: &Association) -> Self {
        Self {
            entity_id: association.entity_id.as_str().to_owned(),
            is_primary: association.is_primary,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReq {
    /// `author`, `category` or `tag`.
    pub kind: String,
    #[serde(default)]
    pub selected_ids: Vec<String>,
    #[serde(default)]
    pub primary_id: Option<String>,
}

impl NormalizeReq {
    pub fn kind(&self) -> ArticleResult<AssociationKind> {
        parse_kind(&self.kind)
    }

    pub fn selection(&self) -> ArticleResult<Selection> {
        SelectionDto {
            selected_ids: self.selected_ids.clone(),
            primary_id: self.primary_id.clone(),
        }
        .into_selection()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NormalizeRes {
    pub associations: Vec<AssociationRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleReq {
    #[serde(default)]
    pub selection: SelectionDto,
    pub id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleRes {
    pub selection: SelectionDto,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReselectPrimaryReq {
    #[serde(default)]
    pub selection: SelectionDto,
    pub candidate_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReselectPrimaryRes {
    pub selection: SelectionDto,
}

// ============================================================================
// Articles
// ============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepareArticleReq {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// `draft` (default) or `published`.
    #[serde(default)]
    pub status: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub authors: SelectionDto,
    #[serde(default)]
    pub categories: SelectionDto,
    #[serde(default)]
    pub tags: SelectionDto,
    #[schema(value_type = Object)]
    #[serde(default)]
    pub body: Value,
}

impl PrepareArticleReq {
    pub fn into_draft(self) -> ArticleResult<ArticleDraft> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("draft") => ArticleStatus::Draft,
            Some("published") => ArticleStatus::Published,
            Some(other) => {
                return Err(ArticleError::InvalidInput(format!(
                    "unknown status {:?} (expected draft or published)",
                    other
                )))
            }
        };

        let published_at = self
            .published_at
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                DateTime::parse_from_rfc3339(s.trim())
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| {
                        ArticleError::InvalidInput(format!("publishedAt is not RFC 3339: {}", e))
                    })
            })
            .transpose()?;

        Ok(ArticleDraft {
            title: self.title,
            slug: self.slug,
            status,
            published_at,
            authors: self.authors.into_selection()?,
            categories: self.categories.into_selection()?,
            tags: self.tags.into_selection()?,
            body: self.body,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepareArticleRes {
    pub title: String,
    pub slug: String,
    pub status: String,
    pub published_at: Option<String>,
    pub authors: Vec<AssociationRes>,
    pub categories: Vec<AssociationRes>,
    pub tags: Vec<AssociationRes>,
    pub primary_author: Option<String>,
    pub primary_category: Option<String>,
    pub html: String,
    pub excerpt: String,
    pub word_count: usize,
    pub reading_time_minutes: u32,
}

impl From<PreparedArticle> for PrepareArticleRes {
    fn from(article: PreparedArticle) -> Self {
        Self {
            primary_author: article.primary_author().map(|id| id.as_str().to_owned()),
            primary_category: article.primary_category().map(|id| id.as_str().to_owned()),
            title: article.title.as_str().to_owned(),
            slug: article.slug.as_str().to_owned(),
            status: match article.status {
                ArticleStatus::Draft => "draft".into(),
                ArticleStatus::Published => "published".into(),
            },
            published_at: article.published_at.map(|t| t.to_rfc3339()),
            authors: rows(&article.authors),
            categories: rows(&article.categories),
            tags: rows(&article.tags),
            html: article.html.into_string(),
            excerpt: article.excerpt,
            word_count: article.word_count,
            reading_time_minutes: article.reading_time_minutes,
        }
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

fn rows(list: &[Association]) -> Vec<AssociationRes> {
    list.iter().map(AssociationRes::from).collect()
}

pub fn parse_kind(kind: &str) -> ArticleResult<AssociationKind> {
    kind.parse()
        .map_err(|e: masthead_core::associations::ParseAssociationKindError| {
            ArticleError::InvalidInput(e.to_string())
        })
}

pub fn parse_id(field: &'static str, raw: &str) -> ArticleResult<EntityId> {
    EntityId::new(raw).map_err(|source| ArticleError::InvalidText { field, source })
}

pub fn parse_ids(field: &'static str, raw: Vec<String>) -> ArticleResult<Vec<EntityId>> {
    raw.iter().map(|s| parse_id(field, s)).collect()
}
