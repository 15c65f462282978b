//! # Posture Core
//!
//! Domain entities, classification rules, state slices and the service port
//! for the tenant security posture dashboard.

pub mod api;
pub mod classify;
pub mod domain;
pub mod error;
pub mod state;

pub use api::PostureApi;
#[cfg(any(test, feature = "mock"))]
pub use api::MockPostureApi;
pub use domain::*;
pub use error::ServiceError;
