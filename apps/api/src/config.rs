use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL_PATH: &str = "models/career_compass_rf.json";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub model_path: PathBuf,
    pub cors_allowed_origins: Vec<String>,
    pub max_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            rust_log: "info".to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            cors_allowed_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.cors_allowed_origins),
            max_batch_size: parse_env("MAX_BATCH_SIZE", defaults.max_batch_size)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
