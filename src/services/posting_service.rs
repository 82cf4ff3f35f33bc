use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::dto::job_dto::JobPostingPayload;
use crate::error::{Error, Result};
use crate::models::company::CompanyDraft;
use crate::models::job::{EmploymentType, JobPosting, JobPostingDraft};
use crate::models::user::Session;
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct PostingService {
    store: Arc<dyn StorageBackend>,
}

struct ShapedPosting {
    title: String,
    description: String,
    location: Option<String>,
    employment_type: Option<String>,
    salary_range: Option<String>,
    company_name: Option<String>,
}

/// Trims everything, drops blank optionals, rejects blank required fields.
/// Employment type tokens outside the known set are kept verbatim.
fn shape(payload: JobPostingPayload) -> Result<ShapedPosting> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::Validation {
            field: "title".to_string(),
            reason: "Title cannot be empty".to_string(),
        });
    }
    let description = payload.description.trim().to_string();
    if description.is_empty() {
        return Err(Error::Validation {
            field: "description".to_string(),
            reason: "Description cannot be empty".to_string(),
        });
    }

    let employment_type = payload
        .employment_type
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if let Some(token) = &employment_type {
        if EmploymentType::parse(token).is_none() {
            warn!("Posting carries unknown employment type token: {}", token);
        }
    }

    Ok(ShapedPosting {
        title,
        description,
        location: trimmed_optional(payload.location),
        employment_type,
        salary_range: trimmed_optional(payload.salary_range),
        company_name: trimmed_optional(payload.company_name),
    })
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl PostingService {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    pub async fn create(&self, session: &Session, payload: JobPostingPayload) -> Result<JobPosting> {
        let shaped = shape(payload)?;
        let (company_id, company_created) = self.resolve_company(session, &shaped).await?;

        let draft = JobPostingDraft {
            title: shaped.title,
            description: shaped.description,
            location: shaped.location,
            employment_type: shaped.employment_type,
            salary_range: shaped.salary_range,
            company_id,
            posted_by: session.user_id,
        };

        match self.store.create_job(session, &draft).await {
            Ok(job) => Ok(job),
            Err(err) => {
                self.roll_back_company(session, company_id, company_created)
                    .await;
                Err(err)
            }
        }
    }

    /// Full replace of the posting fields. Ownership never changes hands.
    pub async fn update(
        &self,
        session: &Session,
        job_id: Uuid,
        payload: JobPostingPayload,
    ) -> Result<JobPosting> {
        let existing = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job posting not found".to_string()))?;
        if existing.posted_by != session.user_id {
            return Err(Error::Forbidden(
                "Only the posting owner can update it".to_string(),
            ));
        }

        let shaped = shape(payload)?;
        let (company_id, company_created) = self.resolve_company(session, &shaped).await?;

        let draft = JobPostingDraft {
            title: shaped.title,
            description: shaped.description,
            location: shaped.location,
            employment_type: shaped.employment_type,
            salary_range: shaped.salary_range,
            company_id,
            posted_by: existing.posted_by,
        };

        match self.store.update_job(session, job_id, &draft).await {
            Ok(job) => Ok(job),
            Err(err) => {
                self.roll_back_company(session, company_id, company_created)
                    .await;
                Err(err)
            }
        }
    }

    /// Find-or-create keyed on (name, owner): posting twice under the same
    /// company name never duplicates the company row.
    async fn resolve_company(
        &self,
        session: &Session,
        shaped: &ShapedPosting,
    ) -> Result<(Option<Uuid>, bool)> {
        let Some(name) = &shaped.company_name else {
            return Ok((None, false));
        };
        if let Some(existing) = self.store.find_company(name, session.user_id).await? {
            return Ok((Some(existing.id), false));
        }
        let draft = CompanyDraft {
            name: name.clone(),
            location: shaped.location.clone(),
            owner_id: session.user_id,
        };
        let company = self.store.create_company(session, &draft).await?;
        Ok((Some(company.id), true))
    }

    /// Deletes a company that was created for a posting write that then
    /// failed, so a retry does not find a phantom row.
    async fn roll_back_company(
        &self,
        session: &Session,
        company_id: Option<Uuid>,
        company_created: bool,
    ) {
        if !company_created {
            return;
        }
        let Some(company_id) = company_id else {
            return;
        };
        if let Err(err) = self.store.delete_company(session, company_id).await {
            warn!("Company {} rollback failed: {}", company_id, err);
        }
    }
}
