use crate::dto::HealthRes;

/// Simple health service shared by the REST API and the main binary
///
/// This service provides a standardised way to check the health status of the Masthead system.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// The response also reports how many highlighting grammars are loaded, which confirms the
    /// formatting ruleset has been built.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Masthead is alive".into(),
            languages: masthead_core::document::warm_up(),
        }
    }
}
