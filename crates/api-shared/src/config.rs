//! Startup configuration.
//!
//! Environment variables are read here, once, by the binaries. The resulting [`CoreConfig`] is
//! passed into services so that nothing reads the environment during request handling.
//!
//! | Variable | Default |
//! |---|---|
//! | `MASTHEAD_REST_ADDR` | `0.0.0.0:3000` |
//! | `MASTHEAD_REQUIRE_PRIMARY_CATEGORY` | `true` |
//! | `MASTHEAD_MAX_DOCUMENT_DEPTH` | `64` |
//! | `MASTHEAD_EXCERPT_CHARS` | `160` |

use masthead_core::config::{primary_policy_from_env_value, usize_from_env_value};
use masthead_core::constants::{
    DEFAULT_EXCERPT_CHARS, DEFAULT_MAX_DOCUMENT_DEPTH, DEFAULT_REST_ADDR,
};
use masthead_core::{ArticleResult, CoreConfig};
use std::env;

pub const REST_ADDR_VAR: &str = "MASTHEAD_REST_ADDR";
pub const REQUIRE_PRIMARY_CATEGORY_VAR: &str = "MASTHEAD_REQUIRE_PRIMARY_CATEGORY";
pub const MAX_DOCUMENT_DEPTH_VAR: &str = "MASTHEAD_MAX_DOCUMENT_DEPTH";
pub const EXCERPT_CHARS_VAR: &str = "MASTHEAD_EXCERPT_CHARS";

/// Resolves the core configuration from the process environment.
///
/// # Errors
///
/// Returns `ArticleError::InvalidConfig` if any variable is set to an unparsable or out-of-range
/// value.
pub fn core_config_from_env() -> ArticleResult<CoreConfig> {
    core_config_from_values(
        env::var(REQUIRE_PRIMARY_CATEGORY_VAR).ok(),
        env::var(MAX_DOCUMENT_DEPTH_VAR).ok(),
        env::var(EXCERPT_CHARS_VAR).ok(),
    )
}

/// Builds a [`CoreConfig`] from raw variable values. `None` or blank means "use the default".
pub fn core_config_from_values(
    require_primary_category: Option<String>,
    max_document_depth: Option<String>,
    excerpt_chars: Option<String>,
) -> ArticleResult<CoreConfig> {
    let policy = primary_policy_from_env_value(require_primary_category)?;
    let depth = usize_from_env_value(
        MAX_DOCUMENT_DEPTH_VAR,
        max_document_depth,
        DEFAULT_MAX_DOCUMENT_DEPTH,
    )?;
    let excerpt = usize_from_env_value(EXCERPT_CHARS_VAR, excerpt_chars, DEFAULT_EXCERPT_CHARS)?;

    CoreConfig::new(policy, depth, excerpt)
}

/// The REST listen address.
pub fn rest_addr() -> String {
    env::var(REST_ADDR_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REST_ADDR.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use masthead_core::{ArticleError, PrimaryPolicy};

    #[test]
    fn unset_values_give_defaults() {
        let cfg = core_config_from_values(None, None, None).expect("defaults");
        assert_eq!(cfg, CoreConfig::default());
    }

    #[test]
    fn values_are_parsed() {
        let cfg = core_config_from_values(
            Some("false".into()),
            Some("12".into()),
            Some("80".into()),
        )
        .expect("valid values");
        assert_eq!(cfg.primary_policy(), PrimaryPolicy::Optional);
        assert_eq!(cfg.max_document_depth(), 12);
        assert_eq!(cfg.excerpt_chars(), 80);
    }

    #[test]
    fn out_of_range_depth_is_rejected() {
        let err = core_config_from_values(None, Some("100000".into()), None)
            .expect_err("depth too large");
        assert!(matches!(err, ArticleError::InvalidConfig(_)));
    }
}
