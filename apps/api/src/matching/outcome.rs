//! Per-applicant outcomes, the failure taxonomy, and the per-run report.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::backend::BackendError;

/// Applicant-level failure. Recorded in the Error Map; never stops the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchFailure {
    #[error("resume text extraction failed: {0}")]
    Extraction(String),

    #[error("scoring service failed: {0}")]
    ScoringService(String),

    #[error("failed to persist match percentage: {0}")]
    Persistence(String),

    #[error("match pipeline aborted before completing")]
    WorkerAborted,
}

/// Batch-level failure. The whole run is aborted and reported once.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to retrieve {what} for job {job_id}: {source}")]
    Retrieval {
        job_id: i64,
        what: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("timed out retrieving {what} for job {job_id}")]
    RetrievalTimeout { job_id: i64, what: &'static str },
}

impl BatchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BatchError::Retrieval { source, .. } if source.is_not_found())
    }
}

/// Pipeline stage an unscored application passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Resolving,
    Scoring,
    Persisting,
}

/// Terminal state of one application within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Already had a persisted percentage; no calls were made.
    Skipped,
    /// No resume uploaded; scored 0 without any calls.
    Unscoreable,
    Scored,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantOutcome {
    pub application_id: i64,
    pub percentage: u8,
    pub disposition: Disposition,
    pub failure: Option<MatchFailure>,
    pub truncated: bool,
}

impl ApplicantOutcome {
    pub fn skipped(application_id: i64, percentage: u8) -> Self {
        Self {
            application_id,
            percentage,
            disposition: Disposition::Skipped,
            failure: None,
            truncated: false,
        }
    }

    pub fn unscoreable(application_id: i64) -> Self {
        Self {
            application_id,
            percentage: 0,
            disposition: Disposition::Unscoreable,
            failure: None,
            truncated: false,
        }
    }

    pub fn scored(application_id: i64, percentage: u8, truncated: bool) -> Self {
        Self {
            application_id,
            percentage,
            disposition: Disposition::Scored,
            failure: None,
            truncated,
        }
    }

    /// A failure that still carries a computed percentage (persistence failed
    /// after scoring succeeded). Every other failure scores 0.
    pub fn failed(
        application_id: i64,
        percentage: u8,
        failure: MatchFailure,
        truncated: bool,
    ) -> Self {
        Self {
            application_id,
            percentage,
            disposition: Disposition::Failed,
            failure: Some(failure),
            truncated,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub skipped: usize,
    pub unscoreable: usize,
    pub scored: usize,
    pub failed: usize,
    pub truncated: usize,
}

/// Result Map and Error Map for one run, keyed by application id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchReport {
    pub results: BTreeMap<i64, u8>,
    pub errors: BTreeMap<i64, String>,
    pub summary: RunSummary,
}

impl MatchReport {
    /// Records an outcome. Keys are write-once within a run.
    pub fn record(&mut self, outcome: ApplicantOutcome) {
        let id = outcome.application_id;
        if self.results.contains_key(&id) {
            warn!("Application {id} already recorded in this run; ignoring duplicate outcome");
            return;
        }

        self.results.insert(id, outcome.percentage);
        if let Some(failure) = outcome.failure {
            self.errors.insert(id, failure.to_string());
        }

        let summary = &mut self.summary;
        summary.total += 1;
        match outcome.disposition {
            Disposition::Skipped => summary.skipped += 1,
            Disposition::Unscoreable => summary.unscoreable += 1,
            Disposition::Scored => summary.scored += 1,
            Disposition::Failed => summary.failed += 1,
        }
        if outcome.truncated {
            summary.truncated += 1;
        }
    }

    pub fn contains(&self, application_id: i64) -> bool {
        self.results.contains_key(&application_id)
    }
}
