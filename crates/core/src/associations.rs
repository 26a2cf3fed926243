//! Author, category and tag associations for an article.
//!
//! The admin form keeps a [`Selection`] per association kind: the set of chosen entity
//! identifiers, kept in the order they were picked for display, plus an optional primary
//! designation. Two selections with the same members and primary are equal whatever the order. Before the article is
//! handed to storage each selection is normalized into a list of [`Association`] rows in which at
//! most one row is flagged primary, and that row is always a member of the selection.
//!
//! Selection state coming from the browser can be stale (a primary that was since deselected,
//! duplicated identifiers from double clicks). Normalization copes with both; it only fails when
//! the [`PrimaryPolicy`] demands a primary that cannot be resolved.

use crate::{ArticleError, ArticleResult};
use indexmap::IndexSet;
use masthead_types::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of entity an article is associated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    Author,
    Category,
    Tag,
}

impl AssociationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AssociationKind::Author => "author",
            AssociationKind::Category => "category",
            AssociationKind::Tag => "tag",
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown association kind {0:?} (expected author, category or tag)")]
pub struct ParseAssociationKindError(String);

impl FromStr for AssociationKind {
    type Err = ParseAssociationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "author" | "authors" => Ok(AssociationKind::Author),
            "category" | "categories" => Ok(AssociationKind::Category),
            "tag" | "tags" => Ok(AssociationKind::Tag),
            other => Err(ParseAssociationKindError(other.to_owned())),
        }
    }
}

/// Which association kinds must carry a primary entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrimaryPolicy {
    /// Articles must have a primary category. Authors and tags never require one.
    #[default]
    CategoryRequired,
    /// No kind requires a primary.
    Optional,
}

impl PrimaryPolicy {
    pub fn requires_primary(self, kind: AssociationKind) -> bool {
        matches!(
            (self, kind),
            (PrimaryPolicy::CategoryRequired, AssociationKind::Category)
        )
    }
}

/// One normalized association row, ready to persist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub entity_id: EntityId,
    pub is_primary: bool,
}

/// Selection state for one association kind, as held by the admin form.
///
/// This is a transient value rebuilt on every submission; it is never persisted directly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub selected_ids: IndexSet<EntityId>,
    #[serde(default)]
    pub primary_id: Option<EntityId>,
}

impl Selection {
    /// Builds a selection. Repeated identifiers collapse onto their first occurrence.
    pub fn new(
        selected_ids: impl IntoIterator<Item = EntityId>,
        primary_id: Option<EntityId>,
    ) -> Self {
        Self {
            selected_ids: selected_ids.into_iter().collect(),
            primary_id,
        }
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected_ids.contains(id)
    }

    /// Toggles membership of `id`.
    ///
    /// Removing the current primary clears the primary designation. For categories this leaves
    /// the selection invalid until a new primary is chosen; that is reported by
    /// [`Selection::normalize`] at submission time rather than here.
    pub fn toggle(&self, id: &EntityId) -> Selection {
        let selected_ids = toggle(&self.selected_ids, id);
        let primary_id = self
            .primary_id
            .as_ref()
            .filter(|p| selected_ids.contains(*p))
            .cloned();

        Selection {
            selected_ids,
            primary_id,
        }
    }

    /// Makes `candidate` the primary. See [`reselect_primary`].
    pub fn reselect_primary(&self, candidate: &EntityId) -> Selection {
        reselect_primary(self, candidate)
    }

    /// Normalizes this selection into association rows. See [`normalize`].
    pub fn normalize(
        &self,
        kind: AssociationKind,
        policy: PrimaryPolicy,
    ) -> ArticleResult<Vec<Association>> {
        normalize(kind, &self.selected_ids, self.primary_id.as_ref(), policy)
    }

    /// Re-derives form state from persisted association rows when an article is opened for
    /// editing.
    ///
    /// Rows are expected to be normalized already, but older data may contain duplicates or more
    /// than one flagged row. Duplicates collapse onto their first occurrence and the first
    /// flagged row wins.
    pub fn from_associations(rows: &[Association]) -> Selection {
        let selected_ids = dedup_preserving_order(rows.iter().map(|r| &r.entity_id));

        let mut flagged = rows.iter().filter(|r| r.is_primary);
        let primary_id = flagged.next().map(|r| r.entity_id.clone());
        let extra = flagged.count();
        if extra > 0 {
            tracing::warn!(
                primary = ?primary_id.as_ref().map(EntityId::as_str),
                extra,
                "persisted associations flag more than one primary; keeping the first"
            );
        }

        Selection {
            selected_ids,
            primary_id,
        }
    }
}

/// Produces the association rows for one kind from raw selection state.
///
/// Identifiers are deduplicated preserving first-seen order. `primary_id` is honoured only when
/// it is a member of `selected_ids`; a stale primary is dropped.
///
/// # Errors
///
/// When `policy` requires a primary for `kind`:
/// - `ArticleError::EmptySelection` if nothing is selected,
/// - `ArticleError::MissingPrimary` if no selected identifier is designated primary.
pub fn normalize<'a>(
    kind: AssociationKind,
    selected_ids: impl IntoIterator<Item = &'a EntityId>,
    primary_id: Option<&EntityId>,
    policy: PrimaryPolicy,
) -> ArticleResult<Vec<Association>> {
    let unique = dedup_preserving_order(selected_ids);
    let resolved = primary_id.filter(|p| unique.contains(*p));

    if policy.requires_primary(kind) {
        if unique.is_empty() {
            return Err(ArticleError::EmptySelection { kind });
        }
        if resolved.is_none() {
            return Err(ArticleError::MissingPrimary { kind });
        }
    }

    if let (Some(stale), None) = (primary_id, resolved) {
        tracing::debug!(%kind, primary = %stale, "dropping primary that is not selected");
    }

    Ok(unique
        .into_iter()
        .map(|entity_id| Association {
            is_primary: resolved == Some(&entity_id),
            entity_id,
        })
        .collect())
}

/// Returns `current` with `id` removed if present, or added at the end otherwise.
///
/// Set equality ignores order, so toggling the same id twice yields a selection equal to
/// `current`.
pub fn toggle(current: &IndexSet<EntityId>, id: &EntityId) -> IndexSet<EntityId> {
    let mut next = current.clone();
    if !next.shift_remove(id) {
        next.insert(id.clone());
    }
    next
}

/// Makes `candidate` the primary of `selection` without changing membership.
///
/// The admin UI only offers already-selected badges, so an unselected candidate indicates stale
/// client state; it is ignored and the selection is returned unchanged.
pub fn reselect_primary(selection: &Selection, candidate: &EntityId) -> Selection {
    if !selection.is_selected(candidate) {
        tracing::debug!(candidate = %candidate, "ignoring primary reselection of unselected id");
        return selection.clone();
    }

    Selection {
        selected_ids: selection.selected_ids.clone(),
        primary_id: Some(candidate.clone()),
    }
}

/// The primary entity among normalized rows, used for bylines and breadcrumbs.
pub fn primary_of(associations: &[Association]) -> Option<&EntityId> {
    associations
        .iter()
        .find(|a| a.is_primary)
        .map(|a| &a.entity_id)
}

fn dedup_preserving_order<'a>(ids: impl IntoIterator<Item = &'a EntityId>) -> IndexSet<EntityId> {
    ids.into_iter().cloned().collect()
}
