//! Environment configuration loading and validation.
//!
//! Follows the teacher's `config/environment.rs`: `load_env()` pulls in a
//! `.env` file if present, then `Config::from_env()` assembles and
//! validates every required value up front so a missing secret fails at
//! boot with a clear message instead of deep inside a handler.

use std::env;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for environment variable {0}: {1}")]
    InvalidVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub music_client_id: String,
    pub music_client_secret: String,
    pub music_redirect_uri: String,
    pub music_auth_base_url: String,
    pub music_api_base_url: String,
    pub server_base_url: String,
    pub port: u16,
    pub environment: Environment,
}

/// Loads variables from a `.env` file in the working directory, if present.
/// Missing `.env` is not an error: system environment variables still apply.
pub fn load_env() {
    dotenvy::dotenv().ok();
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let music_client_id = required("MUSIC_CLIENT_ID")?;
        let music_client_secret = required("MUSIC_CLIENT_SECRET")?;
        let music_redirect_uri = required("MUSIC_REDIRECT_URI")?;
        let server_base_url =
            env::var("SERVER_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let music_auth_base_url = env::var("MUSIC_AUTH_BASE_URL")
            .unwrap_or_else(|_| "https://accounts.music-service.example".to_string());
        let music_api_base_url = env::var("MUSIC_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.music-service.example/v1".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar("PORT", raw))?,
            Err(_) => 8080,
        };

        let environment = match env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        Ok(Config {
            music_client_id,
            music_client_secret,
            music_redirect_uri,
            music_auth_base_url,
            music_api_base_url,
            server_base_url,
            port,
            environment,
        })
    }
}
