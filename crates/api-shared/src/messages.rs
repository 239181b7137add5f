//! JSON payloads shared by every PMS API surface.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain acknowledgement, e.g. `{"message": "Patient created successfully"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

impl ErrorRes {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shapes() {
        let ack = serde_json::to_value(MessageRes::new("done")).unwrap();
        assert_eq!(ack, serde_json::json!({ "message": "done" }));

        let err = serde_json::to_value(ErrorRes::new("Patient not found")).unwrap();
        assert_eq!(err, serde_json::json!({ "detail": "Patient not found" }));
    }
}
