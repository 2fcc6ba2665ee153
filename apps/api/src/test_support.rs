//! In-memory fakes for the backend and the scoring service.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{ApplicationSource, BackendError, MatchStore, ResumeTextResolver};
use crate::models::application::{Applicant, ApplicationStatus, JobApplication, JobRef};
use crate::models::job::JobPosting;
use crate::scoring::{MatchOutcome, MatchScorer};

pub fn sample_job() -> JobPosting {
    JobPosting {
        id: 7,
        title: "Backend Engineer".to_string(),
        description: "Design and operate event-driven services".to_string(),
        company: Some("Northwind".to_string()),
        location: Some("Lisbon".to_string()),
        responsibilities: "Own the ingestion pipeline".to_string(),
        qualifications: "3+ years building distributed systems".to_string(),
        skills: vec!["rust".to_string(), "kafka".to_string(), "postgres".to_string()],
        experience_years: Some(3),
    }
}

pub fn application(
    id: i64,
    applicant_id: i64,
    has_resume: bool,
    match_percentage: Option<u8>,
) -> JobApplication {
    JobApplication {
        id,
        job: Some(JobRef { id: 7 }),
        applicant: Some(Applicant {
            id: applicant_id,
            name: Some(format!("Applicant {applicant_id}")),
            resume_path: has_resume.then(|| format!("resumes/{applicant_id}.pdf")),
        }),
        status: ApplicationStatus::Pending,
        match_percentage,
        applied_at: None,
        distance: None,
    }
}

/// Backend fake implementing retrieval, resolution, and persistence over
/// shared state. Persisted scores are visible to later retrievals.
pub struct FakeBackend {
    job: JobPosting,
    applications: Mutex<Vec<JobApplication>>,
    texts: HashMap<i64, String>,
    failing_persists: HashSet<i64>,
    fail_retrieval: bool,
    stall_retrieval: bool,
    stalled_resolves: HashSet<i64>,
    stalled_persists: HashSet<i64>,
    resolve_calls: Mutex<Vec<i64>>,
    persist_calls: Mutex<Vec<(i64, u8)>>,
}

impl FakeBackend {
    pub fn new(job: JobPosting, applications: Vec<JobApplication>) -> Self {
        Self {
            job,
            applications: Mutex::new(applications),
            texts: HashMap::new(),
            failing_persists: HashSet::new(),
            fail_retrieval: false,
            stall_retrieval: false,
            stalled_resolves: HashSet::new(),
            stalled_persists: HashSet::new(),
            resolve_calls: Mutex::new(Vec::new()),
            persist_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(mut self, applicant_id: i64, text: &str) -> Self {
        self.texts.insert(applicant_id, text.to_string());
        self
    }

    pub fn with_failing_persist(mut self, application_id: i64) -> Self {
        self.failing_persists.insert(application_id);
        self
    }

    pub fn with_failing_retrieval(mut self) -> Self {
        self.fail_retrieval = true;
        self
    }

    /// Application retrieval never completes.
    pub fn with_stalled_retrieval(mut self) -> Self {
        self.stall_retrieval = true;
        self
    }

    pub fn with_stalled_resolve(mut self, applicant_id: i64) -> Self {
        self.stalled_resolves.insert(applicant_id);
        self
    }

    pub fn with_stalled_persist(mut self, application_id: i64) -> Self {
        self.stalled_persists.insert(application_id);
        self
    }

    pub fn applications(&self) -> Vec<JobApplication> {
        self.applications.lock().unwrap().clone()
    }

    pub fn resolve_calls(&self) -> Vec<i64> {
        self.resolve_calls.lock().unwrap().clone()
    }

    pub fn persist_calls(&self) -> Vec<(i64, u8)> {
        self.persist_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApplicationSource for FakeBackend {
    async fn fetch_job(&self, job_id: i64) -> Result<JobPosting, BackendError> {
        if job_id != self.job.id {
            return Err(BackendError::NotFound(format!("job {job_id}")));
        }
        Ok(self.job.clone())
    }

    async fn fetch_applications(&self, _job_id: i64) -> Result<Vec<JobApplication>, BackendError> {
        if self.stall_retrieval {
            std::future::pending::<()>().await;
        }
        if self.fail_retrieval {
            return Err(BackendError::Api {
                status: 500,
                message: "database unavailable".to_string(),
            });
        }
        Ok(self.applications())
    }
}

#[async_trait]
impl ResumeTextResolver for FakeBackend {
    async fn resolve_resume_text(&self, applicant_id: i64) -> Result<String, BackendError> {
        self.resolve_calls.lock().unwrap().push(applicant_id);
        if self.stalled_resolves.contains(&applicant_id) {
            std::future::pending::<()>().await;
        }
        self.texts
            .get(&applicant_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("resume text for applicant {applicant_id}")))
    }
}

#[async_trait]
impl MatchStore for FakeBackend {
    async fn persist_match(
        &self,
        application_id: i64,
        percentage: u8,
    ) -> Result<JobApplication, BackendError> {
        self.persist_calls
            .lock()
            .unwrap()
            .push((application_id, percentage));
        if self.stalled_persists.contains(&application_id) {
            std::future::pending::<()>().await;
        }
        if self.failing_persists.contains(&application_id) {
            return Err(BackendError::Api {
                status: 500,
                message: "write rejected".to_string(),
            });
        }
        let mut applications = self.applications.lock().unwrap();
        let app = applications
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| BackendError::NotFound(format!("application {application_id}")))?;
        app.match_percentage = Some(percentage);
        Ok(app.clone())
    }
}

/// Scoring fake keyed by resume text.
#[derive(Default)]
pub struct FakeScorer {
    scores: HashMap<String, u8>,
    default_score: u8,
    failures: HashSet<String>,
    stalls: HashSet<String>,
    panics: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, text: &str, percentage: u8) -> Self {
        self.scores.insert(text.to_string(), percentage);
        self
    }

    pub fn with_default_score(mut self, percentage: u8) -> Self {
        self.default_score = percentage;
        self
    }

    pub fn with_failure(mut self, text: &str) -> Self {
        self.failures.insert(text.to_string());
        self
    }

    pub fn with_stall(mut self, text: &str) -> Self {
        self.stalls.insert(text.to_string());
        self
    }

    pub fn with_panic(mut self, text: &str) -> Self {
        self.panics.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchScorer for FakeScorer {
    async fn compute_match(&self, _job: &JobPosting, resume_text: &str) -> MatchOutcome {
        self.calls.lock().unwrap().push(resume_text.to_string());
        if self.stalls.contains(resume_text) {
            std::future::pending::<()>().await;
        }
        if self.panics.contains(resume_text) {
            panic!("scorer blew up on {resume_text:?}");
        }
        if self.failures.contains(resume_text) {
            return MatchOutcome::failed("API error (status 503): overloaded", false);
        }
        let percentage = self
            .scores
            .get(resume_text)
            .copied()
            .unwrap_or(self.default_score);
        MatchOutcome::scored(percentage, false)
    }
}
