//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path to the API description document (default: ./openapi.json).
    ///
    /// The same document is served at `/openapi.json` and consulted by the
    /// access log for operation tags and summaries.
    pub api_description_path: PathBuf,

    /// HMAC secret for bearer-token verification.
    pub jwt_secret: String,

    /// Whether the interceptor records access-log entries (default: true).
    pub access_log_enabled: bool,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let api_description_path = env::var("API_DESCRIPTION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./openapi.json"));

        let jwt_secret =
            env::var("JWT_SECRET").context("JWT_SECRET environment variable is required")?;

        let access_log_enabled = env::var("ACCESS_LOG_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .context("ACCESS_LOG_ENABLED must be true or false")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            api_description_path,
            jwt_secret,
            access_log_enabled,
            cors_allowed_origins,
        })
    }
}
