use crate::messages::HealthRes;

/// Simple health service that can be used by any PMS API
///
/// This service provides a standardised way to check the health status of the PMS system.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "PMS is alive".into(),
        }
    }
}
