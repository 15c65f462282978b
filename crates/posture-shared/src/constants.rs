//! Application-wide constants

pub const APP_NAME: &str = "posture";
pub const ENV_PREFIX: &str = "POSTURE";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info,posture=debug";
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const REQUEST_ID_HEADER: &str = "x-request-id";
