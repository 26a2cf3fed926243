//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::associations::PrimaryPolicy;
use crate::constants::{
    DEFAULT_EXCERPT_CHARS, DEFAULT_MAX_DOCUMENT_DEPTH, MAX_DOCUMENT_DEPTH_LIMIT,
    MIN_EXCERPT_CHARS,
};
use crate::{ArticleError, ArticleResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    primary_policy: PrimaryPolicy,
    max_document_depth: usize,
    excerpt_chars: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ArticleError::InvalidConfig` if:
    /// - `max_document_depth` is zero or above the supported limit,
    /// - `excerpt_chars` is too small to hold a meaningful excerpt.
    pub fn new(
        primary_policy: PrimaryPolicy,
        max_document_depth: usize,
        excerpt_chars: usize,
    ) -> ArticleResult<Self> {
        if !(1..=MAX_DOCUMENT_DEPTH_LIMIT).contains(&max_document_depth) {
            return Err(ArticleError::InvalidConfig(format!(
                "max_document_depth must be between 1 and {}",
                MAX_DOCUMENT_DEPTH_LIMIT
            )));
        }

        if excerpt_chars < MIN_EXCERPT_CHARS {
            return Err(ArticleError::InvalidConfig(format!(
                "excerpt_chars must be at least {}",
                MIN_EXCERPT_CHARS
            )));
        }

        Ok(Self {
            primary_policy,
            max_document_depth,
            excerpt_chars,
        })
    }

    pub fn primary_policy(&self) -> PrimaryPolicy {
        self.primary_policy
    }

    pub fn max_document_depth(&self) -> usize {
        self.max_document_depth
    }

    pub fn excerpt_chars(&self) -> usize {
        self.excerpt_chars
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            primary_policy: PrimaryPolicy::default(),
            max_document_depth: DEFAULT_MAX_DOCUMENT_DEPTH,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

/// Parse the primary policy from an optional "require primary category" flag value.
///
/// If `value` is `None` or empty/whitespace, returns the default policy (categories require a
/// primary).
pub fn primary_policy_from_env_value(value: Option<String>) -> ArticleResult<PrimaryPolicy> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(PrimaryPolicy::default()),
        Some("1" | "true" | "yes" | "on") => Ok(PrimaryPolicy::CategoryRequired),
        Some("0" | "false" | "no" | "off") => Ok(PrimaryPolicy::Optional),
        Some(other) => Err(ArticleError::InvalidConfig(format!(
            "expected a boolean for require-primary-category, got {:?}",
            other
        ))),
    }
}

/// Parse a positive integer setting from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn usize_from_env_value(
    name: &str,
    value: Option<String>,
    default: usize,
) -> ArticleResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(v) => v.parse::<usize>().map_err(|e| {
            ArticleError::InvalidConfig(format!("{} must be a positive integer: {}", name, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_requires_primary_category() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.primary_policy(), PrimaryPolicy::CategoryRequired);
        assert_eq!(cfg.max_document_depth(), DEFAULT_MAX_DOCUMENT_DEPTH);
    }

    #[test]
    fn new_rejects_out_of_range_depth() {
        let err = CoreConfig::new(PrimaryPolicy::default(), 0, DEFAULT_EXCERPT_CHARS)
            .expect_err("zero depth should be rejected");
        assert!(matches!(err, ArticleError::InvalidConfig(_)));

        assert!(CoreConfig::new(
            PrimaryPolicy::default(),
            MAX_DOCUMENT_DEPTH_LIMIT + 1,
            DEFAULT_EXCERPT_CHARS
        )
        .is_err());
    }

    #[test]
    fn new_rejects_tiny_excerpt() {
        assert!(CoreConfig::new(PrimaryPolicy::default(), 8, MIN_EXCERPT_CHARS - 1).is_err());
    }

    #[test]
    fn primary_policy_parses_flags() {
        assert_eq!(
            primary_policy_from_env_value(None).expect("default"),
            PrimaryPolicy::CategoryRequired
        );
        assert_eq!(
            primary_policy_from_env_value(Some(" False ".into())).expect("false"),
            PrimaryPolicy::Optional
        );
        assert!(primary_policy_from_env_value(Some("maybe".into())).is_err());
    }

    #[test]
    fn usize_setting_falls_back_to_default() {
        assert_eq!(usize_from_env_value("x", Some("  ".into()), 7).expect("default"), 7);
        assert_eq!(usize_from_env_value("x", Some("12".into()), 7).expect("parsed"), 12);
        assert!(usize_from_env_value("x", Some("-1".into()), 7).is_err());
    }
}
