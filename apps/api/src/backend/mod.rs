//! Backend adapters. The job-board backend owns applications, resume text,
//! and persisted scores. The matcher reaches it only through these traits.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::application::JobApplication;
use crate::models::job::JobPosting;

pub mod client;

pub use client::BackendClient;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

/// Job and application retrieval. Must return the complete application set.
#[async_trait]
pub trait ApplicationSource: Send + Sync {
    async fn fetch_job(&self, job_id: i64) -> Result<JobPosting, BackendError>;

    async fn fetch_applications(&self, job_id: i64) -> Result<Vec<JobApplication>, BackendError>;
}

/// Extracted plain text of an applicant's resume.
#[async_trait]
pub trait ResumeTextResolver: Send + Sync {
    async fn resolve_resume_text(&self, applicant_id: i64) -> Result<String, BackendError>;
}

/// Writes a computed match percentage back onto the application record.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn persist_match(
        &self,
        application_id: i64,
        percentage: u8,
    ) -> Result<JobApplication, BackendError>;
}
