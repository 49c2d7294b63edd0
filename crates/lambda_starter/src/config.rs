use std::path::PathBuf;

use lambda_starter_core::config::{ConfigError, Env};

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_EVENTS_DIR: &str = "events";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_AUTH_ERROR_REDIRECT_URL: &str = "http://localhost:3000/error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub events_dir: PathBuf,
    pub environment: String,
    pub auth_error_redirect_url: String,
}

impl AppConfig {
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        Ok(Self {
            port: env.number_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            events_dir: PathBuf::from(env.string_or("EVENTS_DIR", DEFAULT_EVENTS_DIR)),
            environment: env.string_or("APP_ENV", DEFAULT_ENVIRONMENT),
            auth_error_redirect_url: env
                .string_or("AUTH_ERROR_REDIRECT_URL", DEFAULT_AUTH_ERROR_REDIRECT_URL),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
            events_dir: PathBuf::from(DEFAULT_EVENTS_DIR),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            auth_error_redirect_url: DEFAULT_AUTH_ERROR_REDIRECT_URL.to_string(),
        }
    }
}
