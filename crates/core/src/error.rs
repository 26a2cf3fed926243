use crate::associations::AssociationKind;
use crate::document::RenderFailure;
use masthead_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum ArticleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid {field}: {source}")]
    InvalidText {
        field: &'static str,
        #[source]
        source: TextError,
    },

    #[error("at least one {kind} must be selected")]
    EmptySelection { kind: AssociationKind },
    #[error("a primary {kind} must be chosen from the current selection")]
    MissingPrimary { kind: AssociationKind },

    #[error("invalid article body: {0}")]
    InvalidBody(#[from] RenderFailure),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ArticleError {
    /// Whether the error describes something the submitting user can correct in the form.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ArticleError::InvalidConfig(_))
    }
}

pub type ArticleResult<T> = std::result::Result<T, ArticleError>;
