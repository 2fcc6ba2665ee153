//! Scoring request construction: truncation policy and payload normalization.

use serde::Serialize;

use crate::models::job::JobPosting;

/// Resume text beyond this many characters is never sent to the scoring service.
pub const MAX_CV_LENGTH: usize = 9000;

/// Cuts `text` to its first `MAX_CV_LENGTH` characters (not bytes).
/// Returns the slice to send and whether anything was cut.
pub fn truncate_resume_text(text: &str) -> (&str, bool) {
    match text.char_indices().nth(MAX_CV_LENGTH) {
        Some((boundary, _)) => (&text[..boundary], true),
        None => (text, false),
    }
}

#[derive(Debug, Serialize)]
pub struct MatchRequest<'a> {
    pub job: JobPayload<'a>,
    pub resume: ResumePayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct JobPayload<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub responsibilities: &'a str,
    pub skills: &'a [String],
    pub qualifications: &'a str,
    pub experience_years: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ResumePayload<'a> {
    pub extracted_text: &'a str,
    pub skills: &'a [String],
    pub experience_years: Option<u32>,
}

impl<'a> MatchRequest<'a> {
    /// Builds the request body. `resume_text` must already be truncated.
    ///
    /// The resume's `skills` and `experience_years` are copied from the job,
    /// not the candidate. The scoring service compares against job skills only.
    pub fn new(job: &'a JobPosting, resume_text: &'a str) -> Self {
        Self {
            job: JobPayload {
                title: &job.title,
                description: &job.description,
                company: job.company.as_deref().unwrap_or_default(),
                location: job.location.as_deref().unwrap_or_default(),
                responsibilities: &job.responsibilities,
                skills: &job.skills,
                qualifications: &job.qualifications,
                experience_years: job.experience_years,
            },
            resume: ResumePayload {
                extracted_text: resume_text,
                skills: &job.skills,
                experience_years: job.experience_years,
            },
        }
    }
}
