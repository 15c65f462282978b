//! # Posture Shared
//!
//! Configuration, telemetry and error types shared by the posture dashboard crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;

pub use config::AppConfig;
pub use error::AppError;
