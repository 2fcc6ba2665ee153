//! Match scoring client. Obtains a 0–100 match percentage for a resume
//! against a job from the external scoring service.
//!
//! The client never returns an error to its caller: every failure becomes a
//! zero score plus a reason in `MatchOutcome`. No retries and no memoization;
//! identical inputs are scored from scratch every time.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::application::normalize_percentage;
use crate::models::job::JobPosting;

pub mod payload;

use payload::{truncate_resume_text, MatchRequest, MAX_CV_LENGTH};

const MATCH_PATH: &str = "/api/v1/match";

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scoring request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response has no match_percentage")]
    MissingPercentage,

    #[error("match_percentage is not a finite number")]
    InvalidPercentage,
}

/// Result of one scoring call. `error` is set when the score is a fallback 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub match_percentage: u8,
    pub truncated: bool,
    pub error: Option<String>,
}

impl MatchOutcome {
    pub fn scored(match_percentage: u8, truncated: bool) -> Self {
        Self {
            match_percentage,
            truncated,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>, truncated: bool) -> Self {
        Self {
            match_percentage: 0,
            truncated,
            error: Some(reason.into()),
        }
    }
}

/// Scoring backend seam. The orchestrator holds an `Arc<dyn MatchScorer>`.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn compute_match(&self, job: &JobPosting, resume_text: &str) -> MatchOutcome;
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    match_percentage: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    error: String,
    details: Option<String>,
}

/// HTTP client for the resume-matcher service.
#[derive(Clone)]
pub struct HttpMatchScorer {
    client: Client,
    base_url: String,
}

impl HttpMatchScorer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ScoringError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn request_score(&self, request: &MatchRequest<'_>) -> Result<u8, ScoringError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, MATCH_PATH))
            .json(request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ServiceError>(&body)
                .map(|e| match e.details {
                    Some(details) => format!("{}: {}", e.error, details),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(ScoringError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MatchResponse = serde_json::from_str(&body)?;
        let raw = parsed
            .match_percentage
            .ok_or(ScoringError::MissingPercentage)?;
        let percentage = normalize_percentage(raw).ok_or(ScoringError::InvalidPercentage)?;

        if !(0.0..=100.0).contains(&raw) {
            warn!("Scoring service returned {raw}, clamped to {percentage}");
        }

        Ok(percentage)
    }
}

fn classify_transport(err: reqwest::Error) -> ScoringError {
    if err.is_timeout() {
        ScoringError::Timeout
    } else {
        ScoringError::Http(err)
    }
}

#[async_trait]
impl MatchScorer for HttpMatchScorer {
    async fn compute_match(&self, job: &JobPosting, resume_text: &str) -> MatchOutcome {
        let (text, truncated) = truncate_resume_text(resume_text);
        if truncated {
            warn!(
                "Resume text for job {} truncated from {} to {} characters",
                job.id,
                resume_text.chars().count(),
                MAX_CV_LENGTH
            );
        }

        let request = MatchRequest::new(job, text);

        match self.request_score(&request).await {
            Ok(percentage) => {
                debug!("Scoring service returned {percentage}% for job {}", job.id);
                MatchOutcome::scored(percentage, truncated)
            }
            Err(e) => {
                warn!("Scoring failed for job {}: {e}", job.id);
                MatchOutcome::failed(e.to_string(), truncated)
            }
        }
    }
}
