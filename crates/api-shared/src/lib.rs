//! # API Shared
//!
//! Shared response payloads and services for PMS APIs.
//!
//! Contains:
//! - Wire types for acknowledgements, errors and health checks (`messages` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and anything else that needs to speak the same JSON shapes.

pub mod health;
pub mod messages;

pub use health::HealthService;
pub use messages::{ErrorRes, HealthRes, MessageRes};
