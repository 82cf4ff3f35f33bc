use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// One submitted application. At most one exists per (job_id, applicant_id);
/// the authoritative uniqueness check lives in the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(alias = "created_at")]
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDraft {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
}

/// An application as seen by the owner of the posting, with the job and
/// applicant fields the review page needs flattened in. The resume URL prefers
/// the applicant's profile copy and falls back to the one captured on the
/// application itself.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub applicant_id: Uuid,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}
