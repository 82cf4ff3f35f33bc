use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::dto::application_dto::{ApplyForm, ResumeFile};
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationDraft, ApplicationRecord, ApplicationStatus, ReceivedApplication,
};
use crate::models::profile::ProfileDraft;
use crate::models::user::Session;
use crate::storage::StorageBackend;

pub const RESUME_CONTENT_TYPE: &str = "application/pdf";
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Resume checks in form order: present, then PDF, then size.
pub(crate) fn validate_resume(resume: Option<&ResumeFile>) -> Result<&ResumeFile> {
    let Some(file) = resume else {
        return Err(Error::Validation {
            field: "resume".to_string(),
            reason: "missing".to_string(),
        });
    };
    if file.content_type != RESUME_CONTENT_TYPE {
        return Err(Error::Validation {
            field: "resume".to_string(),
            reason: "wrong_type".to_string(),
        });
    }
    if file.bytes.len() > MAX_RESUME_BYTES {
        return Err(Error::Validation {
            field: "resume".to_string(),
            reason: "too_large".to_string(),
        });
    }
    Ok(file)
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn StorageBackend>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    /// Submits an application. Contact fields are checked before the resume,
    /// and the duplicate check runs before any upload so a second attempt
    /// never stores a file.
    pub async fn submit(
        &self,
        session: &Session,
        job_id: Uuid,
        form: ApplyForm,
    ) -> Result<ApplicationRecord> {
        let name = form.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation {
                field: "name".to_string(),
                reason: "required".to_string(),
            });
        }
        if form.email.trim().is_empty() {
            return Err(Error::Validation {
                field: "email".to_string(),
                reason: "required".to_string(),
            });
        }
        let resume = validate_resume(form.resume.as_ref())?;

        if self.store.get_job(job_id).await?.is_none() {
            return Err(Error::NotFound("Job posting not found".to_string()));
        }
        if self
            .store
            .find_application(job_id, session.user_id)
            .await?
            .is_some()
        {
            return Err(Error::Conflict {
                reason: "already_applied".to_string(),
            });
        }

        let path = format!(
            "resumes/{}_{}_{}",
            session.user_id,
            Utc::now().timestamp_millis(),
            resume.filename
        );
        let resume_url = self
            .store
            .upload_file(session, &path, resume.bytes.clone(), &resume.content_type)
            .await?;

        let draft = ApplicationDraft {
            job_id,
            applicant_id: session.user_id,
            cover_letter: form
                .cover_letter
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            resume_url: Some(resume_url.clone()),
            status: ApplicationStatus::Pending,
        };
        let record = self.store.create_application(session, &draft).await?;

        // Post-submit sync is best effort: the application already exists, so
        // a failed name or profile write only logs.
        if let Err(err) = self.store.update_full_name(session, &name).await {
            warn!("Name sync after application failed: {}", err);
        }
        let mut profile = ProfileDraft::for_user(session.user_id);
        profile.resume_url = Some(resume_url);
        profile.phone = form
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        if let Err(err) = self.store.upsert_profile(session, &profile).await {
            warn!("Profile sync after application failed: {}", err);
        }

        Ok(record)
    }

    /// Applications received across every posting the caller owns.
    pub async fn received(&self, session: &Session) -> Result<Vec<ReceivedApplication>> {
        self.store
            .applications_for_owner(session, session.user_id)
            .await
    }
}
