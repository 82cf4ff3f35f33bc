use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::filter::{FilterOutcome, FilterSpec, SalaryBucket};
use crate::models::job::{employment_type_label, EmploymentType, JobPosting};

/// Shared by create and update: an update is a full replace of the posting
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobPostingPayload {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    pub employment_type: Option<String>,
    pub salary_range: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
}

impl JobListQuery {
    /// Unknown type or salary tokens degrade to "no constraint" rather than
    /// rejecting the request.
    pub fn into_filter(self) -> FilterSpec {
        FilterSpec {
            search: self.search,
            employment_type: self
                .job_type
                .as_deref()
                .map(str::trim)
                .and_then(EmploymentType::parse),
            location: self.location,
            salary_bucket: self.salary.as_deref().and_then(SalaryBucket::parse),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub employment_type_label: Option<String>,
    pub salary_range: Option<String>,
    pub company_id: Option<uuid::Uuid>,
    pub company_name: Option<String>,
    pub posted_by: uuid::Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
    pub matched_count: usize,
    pub total_count: usize,
}

impl From<JobPosting> for JobResponse {
    fn from(value: JobPosting) -> Self {
        let employment_type_label = value
            .employment_type
            .as_deref()
            .map(employment_type_label);
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            location: value.location,
            employment_type: value.employment_type,
            employment_type_label,
            salary_range: value.salary_range,
            company_id: value.company_id,
            company_name: value.company_name,
            posted_by: value.posted_by,
            created_at: value.created_at,
        }
    }
}

impl From<FilterOutcome> for JobListResponse {
    fn from(value: FilterOutcome) -> Self {
        Self {
            items: value.matched.into_iter().map(Into::into).collect(),
            matched_count: value.matched_count,
            total_count: value.total_count,
        }
    }
}
