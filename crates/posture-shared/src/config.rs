//! Configuration management

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{
    APP_NAME, DEFAULT_BASE_URL, DEFAULT_LOG_DIRECTORY, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_SECONDS,
    ENV_PREFIX,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ApiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Raw `name=value` cookie seeded into the client's cookie store.
    pub session_cookie: Option<String>,
    /// Dashboard user the per-user score endpoints are queried for.
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
    pub directory: String,
}

impl AppConfig {
    /// Load from `config/` relative to the working directory.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new("config"))
    }

    /// Defaults, then `{dir}/default`, then `{dir}/{APP_ENV}`, then `POSTURE_*` variables.
    pub fn load_from(dir: &Path) -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let default_file = dir.join("default");
        let env_file = dir.join(&env);

        let config = Config::builder()
            .set_default("app.env", env.as_str())?
            .set_default("app.name", APP_NAME)?
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("log.level", DEFAULT_LOG_LEVEL)?
            .set_default("log.format", "pretty")?
            .set_default("log.directory", DEFAULT_LOG_DIRECTORY)?
            .add_source(File::with_name(&default_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
