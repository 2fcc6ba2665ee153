//! Axum route handlers for the Match API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::matching::orchestrator::MatchRun;
use crate::models::job::JobPosting;
use crate::scoring::MatchOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ComputeMatchRequest {
    pub job: JobPosting,
    pub resume_text: String,
}

/// POST /api/v1/jobs/:job_id/matches
///
/// Scores every unscored application of the job and returns the Result Map
/// and Error Map. Retrieval failures fail the whole request.
pub async fn handle_run_matches(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<MatchRun>, AppError> {
    let run = state.orchestrator.run(job_id).await?;
    Ok(Json(run))
}

/// POST /api/v1/match
///
/// Scores one resume text against a job without touching any application.
/// Scoring failures come back as a 0 with `error` set, not as an HTTP error.
pub async fn handle_compute_match(
    State(state): State<AppState>,
    Json(request): Json<ComputeMatchRequest>,
) -> Result<Json<MatchOutcome>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let outcome = state
        .scorer
        .compute_match(&request.job, &request.resume_text)
        .await;
    Ok(Json(outcome))
}
