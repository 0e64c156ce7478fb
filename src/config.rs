// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. Cloud Run injects
//! secrets as environment variables, so nothing is fetched at runtime.

use crate::services::openai;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Where users, missions and the pool are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process, lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        }
    }
}

/// Generative provider settings. Absent when no API key is configured.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Allowed CORS origin
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    pub store_backend: StoreBackend,

    /// HS256 secret shared with the auth provider (raw bytes)
    pub auth_jwt_secret: Vec<u8>,
    /// Expected `aud` claim
    pub auth_jwt_audience: String,

    pub generation: Option<GenerationConfig>,
    /// Budget for one generative call before falling back to templates
    pub generation_timeout: Duration,

    /// 0 = calendar days, otherwise accelerated windows of N minutes
    pub day_window_minutes: u32,
}

impl Config {
    /// Config for tests: in-memory store, no generative provider.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:8081".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            auth_jwt_secret: b"test_auth_secret_32_bytes_minimum".to_vec(),
            auth_jwt_audience: "authenticated".to_string(),
            generation: None,
            generation_timeout: Duration::from_secs(8),
            day_window_minutes: 0,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let generation = optional("OPENAI_API_KEY").map(|api_key| GenerationConfig {
            api_key,
            base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            model: optional("OPENAI_MODEL").unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
        });

        Ok(Self {
            port: parsed("PORT", 8080)?,
            frontend_url: optional("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:8081".to_string()),
            gcp_project_id: optional("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            store_backend: parsed("STORE_BACKEND", StoreBackend::Firestore)?,

            auth_jwt_secret: optional("AUTH_JWT_SECRET")
                .ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?
                .into_bytes(),
            auth_jwt_audience: optional("AUTH_JWT_AUDIENCE")
                .unwrap_or_else(|| "authenticated".to_string()),

            generation,
            generation_timeout: Duration::from_secs(parsed("GENERATION_TIMEOUT_SECS", 8)?),

            day_window_minutes: parsed("DAY_WINDOW_MINUTES", 0)?,
        })
    }
}

/// Trimmed value of `name`, treating empty as unset.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name, raw)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
