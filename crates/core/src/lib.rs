//! # Masthead Core
//!
//! Core editorial logic for the Masthead publishing system.
//!
//! This crate contains pure operations over in-memory article data:
//! - Association normalization for authors, categories and tags
//! - Structured document rendering to HTML, with syntax highlighting and typography
//! - Plain-text extraction for excerpts and reading time
//! - Assembly of submitted article drafts into validated values ready to persist
//!
//! **No I/O**: persistence, HTTP serving, feeds and authentication belong to the collaborators
//! that call into this crate (`api-rest`, the CLI, the storage layer).

pub mod article;
pub mod associations;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod validation;

pub use article::{ArticleDraft, ArticleService, ArticleStatus, PreparedArticle};
pub use associations::{
    normalize, primary_of, reselect_primary, toggle, Association, AssociationKind, PrimaryPolicy,
    Selection,
};
pub use config::CoreConfig;
pub use document::{render, try_render, Document, RenderFailure, RenderedHtml};
pub use error::{ArticleError, ArticleResult};
pub use masthead_types::{EntityId, NonEmptyText, Slug, TextError};
