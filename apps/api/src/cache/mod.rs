//! Explicit, injected key-value cache with per-entry time-to-live.
//!
//! Used to avoid re-extracting resume text on every match run. Cache failures
//! never fail a resolution; they are logged and the backend is asked directly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::backend::{BackendError, ResumeTextResolver};

pub mod redis_store;

pub use redis_store::RedisTextCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait TextCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Process-local cache. Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryTextCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryTextCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextCache for MemoryTextCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }
}

/// Resolver decorator that serves resume text from a `TextCache` when fresh.
pub struct CachedResolver {
    inner: Arc<dyn ResumeTextResolver>,
    cache: Arc<dyn TextCache>,
    ttl: Duration,
}

impl CachedResolver {
    pub fn new(
        inner: Arc<dyn ResumeTextResolver>,
        cache: Arc<dyn TextCache>,
        ttl: Duration,
    ) -> Self {
        Self { inner, cache, ttl }
    }
}

fn resume_key(applicant_id: i64) -> String {
    format!("resume_text:{applicant_id}")
}

#[async_trait]
impl ResumeTextResolver for CachedResolver {
    async fn resolve_resume_text(&self, applicant_id: i64) -> Result<String, BackendError> {
        let key = resume_key(applicant_id);

        match self.cache.get(&key).await {
            Ok(Some(text)) => {
                debug!("Resume text cache hit for applicant {applicant_id}");
                return Ok(text);
            }
            Ok(None) => {}
            Err(e) => warn!("Resume text cache read failed for applicant {applicant_id}: {e}"),
        }

        let text = self.inner.resolve_resume_text(applicant_id).await?;

        if let Err(e) = self.cache.put(&key, &text, self.ttl).await {
            warn!("Resume text cache write failed for applicant {applicant_id}: {e}");
        }

        Ok(text)
    }
}
