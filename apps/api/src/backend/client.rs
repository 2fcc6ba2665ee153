use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApplicationSource, BackendError, MatchStore, ResumeTextResolver};
use crate::models::application::JobApplication;
use crate::models::job::JobPosting;

/// Query for the backend's filtered application listing.
///
/// The endpoint filters, sorts, and paginates server-side with defaults that
/// drop applicants (percentage threshold 80, distance threshold 10). Every
/// parameter is sent explicitly so the listing comes back complete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    pub job_id: i64,
    pub filter_type: &'static str,
    pub location_threshold: f64,
    pub percentage_threshold: u32,
    pub search: String,
    pub sort_by: &'static str,
    pub limit: i32,
}

impl ApplicationQuery {
    pub fn unfiltered(job_id: i64) -> Self {
        Self {
            job_id,
            filter_type: "all",
            location_threshold: f64::MAX,
            percentage_threshold: 0,
            search: String::new(),
            sort_by: "percentage",
            limit: i32::MAX,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: Option<String>,
    source: Option<String>,
}

/// HTTP client for the job-board backend. Implements retrieval, resume text
/// resolution, and score persistence.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Maps non-success statuses to `BackendError`, keeping the response body as
/// the message.
async fn ensure_success(response: Response, what: &str) -> Result<Response, BackendError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

#[async_trait]
impl ApplicationSource for BackendClient {
    async fn fetch_job(&self, job_id: i64) -> Result<JobPosting, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/jobs/{job_id}")))
            .send()
            .await?;
        let response = ensure_success(response, &format!("job {job_id}")).await?;
        Ok(response.json().await?)
    }

    async fn fetch_applications(&self, job_id: i64) -> Result<Vec<JobApplication>, BackendError> {
        let response = self
            .client
            .get(self.url("/api/applications/filtered"))
            .query(&ApplicationQuery::unfiltered(job_id))
            .send()
            .await?;
        let response = ensure_success(response, &format!("applications for job {job_id}")).await?;
        let applications: Vec<JobApplication> = response.json().await?;
        debug!(
            "Fetched {} applications for job {}",
            applications.len(),
            job_id
        );
        Ok(applications)
    }
}

#[async_trait]
impl ResumeTextResolver for BackendClient {
    async fn resolve_resume_text(&self, applicant_id: i64) -> Result<String, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/resume/extract/{applicant_id}")))
            .send()
            .await?;
        let response =
            ensure_success(response, &format!("resume text for applicant {applicant_id}")).await?;
        let body: ExtractResponse = response.json().await?;
        debug!(
            "Resolved resume text for applicant {} (source: {})",
            applicant_id,
            body.source.as_deref().unwrap_or("unknown")
        );
        body.text
            .ok_or_else(|| BackendError::Malformed("extract response has no `text`".to_string()))
    }
}

#[async_trait]
impl MatchStore for BackendClient {
    async fn persist_match(
        &self,
        application_id: i64,
        percentage: u8,
    ) -> Result<JobApplication, BackendError> {
        let response = self
            .client
            .post(self.url(&format!(
                "/api/applications/{application_id}/match-percentage"
            )))
            .query(&[("percentage", percentage)])
            .send()
            .await?;
        let response =
            ensure_success(response, &format!("application {application_id}")).await?;
        Ok(response.json().await?)
    }
}
