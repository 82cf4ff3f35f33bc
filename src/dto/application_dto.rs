use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::application::{ApplicationRecord, ApplicationStatus, ReceivedApplication};

/// Application form as assembled from the multipart request. Field-level
/// checks live in the service so they run in a fixed order.
#[derive(Debug, Clone, Default)]
pub struct ApplyForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeFile>,
}

#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: uuid::Uuid,
    pub job_id: uuid::Uuid,
    pub applicant_id: uuid::Uuid,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedApplicationResponse {
    pub id: uuid::Uuid,
    pub job_id: uuid::Uuid,
    pub job_title: String,
    pub applicant_id: uuid::Uuid,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedListResponse {
    pub items: Vec<ReceivedApplicationResponse>,
}

impl From<ApplicationRecord> for ApplicationResponse {
    fn from(value: ApplicationRecord) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            applicant_id: value.applicant_id,
            cover_letter: value.cover_letter,
            resume_url: value.resume_url,
            status: value.status,
            applied_at: value.applied_at,
        }
    }
}

impl From<ReceivedApplication> for ReceivedApplicationResponse {
    fn from(value: ReceivedApplication) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            job_title: value.job_title,
            applicant_id: value.applicant_id,
            applicant_name: value.applicant_name,
            applicant_email: value.applicant_email,
            applicant_phone: value.applicant_phone,
            cover_letter: value.cover_letter,
            resume_url: value.resume_url,
            status: value.status,
            applied_at: value.applied_at,
        }
    }
}
