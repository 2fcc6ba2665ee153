use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the job-board backend (applications, resume text, scores).
    pub backend_url: String,
    /// Base URL of the resume-matcher scoring service.
    pub matcher_url: String,
    /// Enables the shared Redis resume text cache when set.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub match_workers: usize,
    pub call_timeout: Duration,
    /// Zero disables resume text caching.
    pub resume_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?,
            matcher_url: require_env("MATCHER_URL")?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_workers: parse_env::<usize>("MATCH_WORKERS", 4)?.max(1),
            call_timeout: Duration::from_secs(parse_env("CALL_TIMEOUT_SECS", 30)?),
            resume_cache_ttl: Duration::from_secs(parse_env("RESUME_CACHE_TTL_SECS", 3600)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
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
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
