//! Match orchestrator: drives resolve → score → persist for every unscored
//! application of a job and assembles the run's Result Map and Error Map.
//!
//! Flow: fetch job → fetch applications → partition (skip pre-scored, zero
//!       the resume-less) → worker pool over the remaining queue → report.
//!
//! Each worker finishes one application's whole pipeline before taking the
//! next. The pipeline runs in its own task so a panic only costs that
//! application. Workers report outcomes keyed by application id and never share a
//! key, so the maps need no locking. A pool of one worker reproduces the
//! sequential behaviour in retrieval order.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::{ApplicationSource, MatchStore, ResumeTextResolver};
use crate::matching::outcome::{
    ApplicantOutcome, BatchError, MatchFailure, MatchReport, MatchStage,
};
use crate::models::application::JobApplication;
use crate::models::job::JobPosting;
use crate::scoring::MatchScorer;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Number of concurrent pipelines. Clamped to at least 1.
    pub workers: usize,
    /// Upper bound on every external call made during a run.
    pub call_timeout: Duration,
}

/// One completed orchestration run.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRun {
    pub run_id: Uuid,
    pub job_id: i64,
    #[serde(flatten)]
    pub report: MatchReport,
}

#[derive(Debug, Clone, Copy)]
struct PendingMatch {
    application_id: i64,
    applicant_id: i64,
}

pub struct MatchOrchestrator {
    source: Arc<dyn ApplicationSource>,
    pipeline: Arc<Pipeline>,
    settings: OrchestratorSettings,
}

impl MatchOrchestrator {
    pub fn new(
        source: Arc<dyn ApplicationSource>,
        resolver: Arc<dyn ResumeTextResolver>,
        scorer: Arc<dyn MatchScorer>,
        store: Arc<dyn MatchStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        let pipeline = Arc::new(Pipeline {
            resolver,
            scorer,
            store,
            call_timeout: settings.call_timeout,
        });
        Self {
            source,
            pipeline,
            settings,
        }
    }

    /// Scores every unscored application of `job_id`.
    ///
    /// Retrieval failures abort the run. Everything after retrieval is
    /// per-applicant and ends up in the report, never in `Err`.
    pub async fn run(&self, job_id: i64) -> Result<MatchRun, BatchError> {
        let run_id = Uuid::new_v4();
        info!("Match run {run_id} started for job {job_id}");

        let job = self
            .retrieve(job_id, "job", self.source.fetch_job(job_id))
            .await?;
        let applications = self
            .retrieve(
                job_id,
                "applications",
                self.source.fetch_applications(job_id),
            )
            .await?;
        info!(
            "Match run {run_id}: {} applications retrieved for job {job_id}",
            applications.len()
        );

        let report = self.score_applications(Arc::new(job), applications).await;

        let s = &report.summary;
        info!(
            "Match run {run_id} finished for job {job_id}: total={} skipped={} unscoreable={} scored={} failed={} truncated={}",
            s.total, s.skipped, s.unscoreable, s.scored, s.failed, s.truncated
        );

        Ok(MatchRun {
            run_id,
            job_id,
            report,
        })
    }

    async fn retrieve<T, F>(
        &self,
        job_id: i64,
        what: &'static str,
        call: F,
    ) -> Result<T, BatchError>
    where
        F: Future<Output = Result<T, crate::backend::BackendError>>,
    {
        match timeout(self.settings.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                error!("Retrieval of {what} for job {job_id} failed: {source}");
                Err(BatchError::Retrieval {
                    job_id,
                    what,
                    source,
                })
            }
            Err(_) => {
                error!("Retrieval of {what} for job {job_id} timed out");
                Err(BatchError::RetrievalTimeout { job_id, what })
            }
        }
    }

    /// Runs the per-applicant state machine over an already retrieved batch.
    pub async fn score_applications(
        &self,
        job: Arc<JobPosting>,
        applications: Vec<JobApplication>,
    ) -> MatchReport {
        let mut report = MatchReport::default();
        let mut queue = VecDeque::new();

        for app in applications {
            if let Some(existing) = app.match_percentage {
                debug!("Application {} already scored ({existing}%), skipping", app.id);
                report.record(ApplicantOutcome::skipped(app.id, existing));
                continue;
            }
            match app.resume_owner() {
                Some(applicant_id) => queue.push_back(PendingMatch {
                    application_id: app.id,
                    applicant_id,
                }),
                None => {
                    debug!("Application {} has no resume, scoring 0", app.id);
                    report.record(ApplicantOutcome::unscoreable(app.id));
                }
            }
        }

        if queue.is_empty() {
            return report;
        }

        let queued: Vec<i64> = queue.iter().map(|p| p.application_id).collect();
        let worker_count = self.settings.workers.clamp(1, queue.len());
        debug!(
            "Scoring {} applications with {worker_count} workers",
            queue.len()
        );

        let queue = Arc::new(Mutex::new(queue));
        let (tx, mut rx) = mpsc::unbounded_channel::<ApplicantOutcome>();
        let mut workers = JoinSet::new();

        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let pipeline = Arc::clone(&self.pipeline);
            let job = Arc::clone(&job);
            let tx = tx.clone();
            workers.spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(pending) = next else { break };
                    let task = {
                        let pipeline = Arc::clone(&pipeline);
                        let job = Arc::clone(&job);
                        tokio::spawn(async move { pipeline.process(&job, pending).await })
                    };
                    let outcome = match task.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!(
                                "Pipeline for application {} aborted: {e}",
                                pending.application_id
                            );
                            ApplicantOutcome::failed(
                                pending.application_id,
                                0,
                                MatchFailure::WorkerAborted,
                                false,
                            )
                        }
                    };
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!("Match worker {worker_id} drained the queue");
            });
        }
        drop(tx);

        while let Some(outcome) = rx.recv().await {
            report.record(outcome);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Match worker terminated abnormally: {e}");
            }
        }

        for application_id in queued {
            if !report.contains(application_id) {
                report.record(ApplicantOutcome::failed(
                    application_id,
                    0,
                    MatchFailure::WorkerAborted,
                    false,
                ));
            }
        }

        report
    }
}

/// The resolve → score → persist pipeline for a single application.
struct Pipeline {
    resolver: Arc<dyn ResumeTextResolver>,
    scorer: Arc<dyn MatchScorer>,
    store: Arc<dyn MatchStore>,
    call_timeout: Duration,
}

impl Pipeline {
    async fn bounded<T>(
        &self,
        stage: MatchStage,
        call: impl Future<Output = T>,
    ) -> Result<T, String> {
        timeout(self.call_timeout, call).await.map_err(|_| {
            format!(
                "{stage:?} timed out after {}s",
                self.call_timeout.as_secs_f64()
            )
        })
    }

    async fn process(&self, job: &JobPosting, pending: PendingMatch) -> ApplicantOutcome {
        let PendingMatch {
            application_id,
            applicant_id,
        } = pending;

        let text = match self
            .bounded(
                MatchStage::Resolving,
                self.resolver.resolve_resume_text(applicant_id),
            )
            .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return self.fail(application_id, MatchFailure::Extraction(e.to_string()), false),
            Err(reason) => return self.fail(application_id, MatchFailure::Extraction(reason), false),
        };

        let outcome = match self
            .bounded(MatchStage::Scoring, self.scorer.compute_match(job, &text))
            .await
        {
            Ok(outcome) => outcome,
            Err(reason) => {
                return self.fail(application_id, MatchFailure::ScoringService(reason), false)
            }
        };
        // A failed score is not persisted, so the next run retries it.
        if let Some(reason) = outcome.error {
            return self.fail(
                application_id,
                MatchFailure::ScoringService(reason),
                outcome.truncated,
            );
        }
        let percentage = outcome.match_percentage;

        let persisted = match self
            .bounded(
                MatchStage::Persisting,
                self.store.persist_match(application_id, percentage),
            )
            .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(reason) => Err(reason),
        };

        match persisted {
            Ok(()) => {
                debug!("Application {application_id} scored {percentage}%");
                ApplicantOutcome::scored(application_id, percentage, outcome.truncated)
            }
            Err(reason) => {
                // The score is still reported for this run; the next run
                // recomputes it because nothing was stored.
                warn!("Application {application_id}: computed {percentage}% but persisting failed: {reason}");
                ApplicantOutcome::failed(
                    application_id,
                    percentage,
                    MatchFailure::Persistence(reason),
                    outcome.truncated,
                )
            }
        }
    }

    fn fail(&self, application_id: i64, failure: MatchFailure, truncated: bool) -> ApplicantOutcome {
        warn!("Application {application_id} failed: {failure}");
        ApplicantOutcome::failed(application_id, 0, failure, truncated)
    }
}
