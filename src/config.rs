//! Configuration management for the circulation desk

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the hosted backend (data API and auth API)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyzcompany.example.co`
    pub url: String,
    /// Public (anon) API key sent with every request
    pub anon_key: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret the backend signs access tokens with
    pub jwt_secret: String,
    /// Expected `aud` claim of access tokens
    pub audience: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Optional directory for daily rolling log files
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config", env::vars().collect())
    }

    /// Load from the files under `dir` and the given environment.
    ///
    /// Files are optional; every field missing from all sources takes its default.
    pub fn load_from(dir: &str, vars: Map<String, String>) -> Result<Self, ConfigError> {
        let run_mode = vars
            .get("RUN_MODE")
            .cloned()
            .unwrap_or_else(|| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Add environment variables, e.g. CIRCULATION_AUTH__AUDIENCE
            .add_source(
                Environment::with_prefix("CIRCULATION")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("backend.url", vars.get("BACKEND_URL").cloned())?
            .set_override_option("backend.anon_key", vars.get("BACKEND_ANON_KEY").cloned())?
            .set_override_option("auth.jwt_secret", vars.get("JWT_SECRET").cloned())?
            .build()?;

        config.try_deserialize()
    }
}

impl BackendConfig {
    /// Base URL of the row-level data API
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }

    /// Base URL of the authentication API
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url.trim_end_matches('/'))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            audience: "authenticated".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
