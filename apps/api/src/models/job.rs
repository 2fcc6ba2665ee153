use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A job posting as returned by the backend. Read-only input to scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qualifications: String,
    /// Ordered as entered by the recruiter; duplicates are kept.
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
}
