use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status of an application. The backend stores these capitalized
/// ("Pending"); both spellings are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    #[serde(alias = "Pending", alias = "PENDING")]
    Pending,
    #[serde(alias = "Accepted", alias = "ACCEPTED")]
    Accepted,
    #[serde(alias = "Rejected", alias = "REJECTED")]
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    /// `None` (or blank) means no resume has been uploaded yet.
    #[serde(default)]
    pub resume_path: Option<String>,
}

impl Applicant {
    pub fn has_resume(&self) -> bool {
        self.resume_path
            .as_deref()
            .is_some_and(|path| !path.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRef {
    pub id: i64,
}

/// An application to a job, owned by the backend. The matcher only reads
/// `status` and `match_percentage` and writes the percentage back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: i64,
    #[serde(default)]
    pub job: Option<JobRef>,
    #[serde(default)]
    pub applicant: Option<Applicant>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "deserialize_percentage")]
    pub match_percentage: Option<u8>,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl JobApplication {
    /// The applicant whose resume can be scored, if one has been uploaded.
    pub fn resume_owner(&self) -> Option<i64> {
        self.applicant
            .as_ref()
            .filter(|a| a.has_resume())
            .map(|a| a.id)
    }
}

/// Rounds a raw score to an integer percentage, clamped to 0–100.
/// Returns `None` for NaN and infinities.
pub fn normalize_percentage(raw: f64) -> Option<u8> {
    if !raw.is_finite() {
        return None;
    }
    Some(raw.clamp(0.0, 100.0).round() as u8)
}

fn deserialize_percentage<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.and_then(normalize_percentage))
}
