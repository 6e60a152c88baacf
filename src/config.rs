//! Application configuration loaded from environment variables.
//!
//! In Cloud Run the signing key is injected as an environment variable via a
//! secret binding, so everything is read from the process environment once at
//! startup.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Web client origin allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key shared with the auth provider bridge (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?;
        if jwt_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid(
                "JWT_SIGNING_KEY",
                format!("must be at least {MIN_SIGNING_KEY_LEN} bytes"),
            ));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port,
            jwt_signing_key: jwt_signing_key.into_bytes(),
        })
    }
}

const MIN_SIGNING_KEY_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
