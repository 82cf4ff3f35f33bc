//! In-memory [`StorageBackend`] for the HTTP test suites. Mirrors the
//! collaborator behaviors the services lean on: duplicate detection, token
//! checks, merge-upserts, newest-first listings.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{ApplicationDraft, ApplicationRecord, ReceivedApplication};
use crate::models::company::{Company, CompanyDraft};
use crate::models::job::{JobPosting, JobPostingDraft};
use crate::models::profile::{Profile, ProfileDraft};
use crate::models::user::{
    AuthenticatedUser, Identity, NewUser, Session, SessionTokens, SignUpOutcome, User,
};
use crate::storage::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    // email -> (auth id, password)
    accounts: HashMap<String, (Uuid, String)>,
    // access token -> identity
    sessions: HashMap<String, Identity>,
    users: Vec<User>,
    profiles: HashMap<Uuid, Profile>,
    companies: Vec<Company>,
    jobs: Vec<JobPosting>,
    applications: Vec<ApplicationRecord>,
    uploads: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn company_count(&self) -> usize {
        self.inner.lock().await.companies.len()
    }

    pub async fn application_count(&self) -> usize {
        self.inner.lock().await.applications.len()
    }

    pub async fn upload_count(&self) -> usize {
        self.inner.lock().await.uploads.len()
    }
}

fn empty_profile(user_id: Uuid) -> Profile {
    Profile {
        user_id,
        phone: None,
        bio: None,
        skills: None,
        experience_years: None,
        linkedin_url: None,
        portfolio_url: None,
        resume_url: None,
    }
}

fn invalid_token() -> Error {
    Error::Unauthorized("invalid_token".to_string())
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let mut inner = self.inner.lock().await;
        if inner.accounts.contains_key(email) {
            return Err(Error::Conflict {
                reason: "user_already_registered".to_string(),
            });
        }
        let user_id = Uuid::new_v4();
        let access_token = format!("token-{}", Uuid::new_v4());
        inner
            .accounts
            .insert(email.to_string(), (user_id, password.to_string()));
        inner.sessions.insert(
            access_token.clone(),
            Identity {
                user_id,
                email: email.to_string(),
            },
        );
        Ok(SignUpOutcome {
            user_id,
            email: email.to_string(),
            session: Some(SessionTokens {
                access_token,
                refresh_token: None,
                expires_in: Some(3600),
            }),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
        let mut inner = self.inner.lock().await;
        let Some((user_id, stored)) = inner.accounts.get(email).cloned() else {
            return Err(Error::Unauthorized(
                "Invalid login credentials".to_string(),
            ));
        };
        if stored != password {
            return Err(Error::Unauthorized(
                "Invalid login credentials".to_string(),
            ));
        }
        let access_token = format!("token-{}", Uuid::new_v4());
        inner.sessions.insert(
            access_token.clone(),
            Identity {
                user_id,
                email: email.to_string(),
            },
        );
        Ok(AuthenticatedUser {
            user_id,
            email: email.to_string(),
            tokens: SessionTokens {
                access_token,
                refresh_token: None,
                expires_in: Some(3600),
            },
        })
    }

    async fn send_password_reset(&self, _email: &str) -> Result<()> {
        // GoTrue acknowledges recovery requests for unknown addresses too.
        Ok(())
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        if let Some(account) = inner.accounts.get_mut(&session.email) {
            account.1 = new_password.to_string();
        }
        Ok(())
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.sessions.remove(&session.access_token).is_none() {
            return Err(invalid_token());
        }
        Ok(())
    }

    async fn current_identity(&self, access_token: &str) -> Result<Identity> {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .get(access_token)
            .cloned()
            .ok_or_else(invalid_token)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|existing| existing.email == user.email) {
            return Err(Error::Conflict {
                reason: "duplicate".to_string(),
            });
        }
        let row = User {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|user| user.email == email).cloned())
    }

    async fn update_full_name(&self, session: &Session, full_name: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        if let Some(user) = inner
            .users
            .iter_mut()
            .find(|user| user.email == session.email)
        {
            user.full_name = full_name.to_string();
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let inner = self.inner.lock().await;
        Ok(inner.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, session: &Session, draft: &ProfileDraft) -> Result<Profile> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        let entry = inner
            .profiles
            .entry(draft.user_id)
            .or_insert_with(|| empty_profile(draft.user_id));
        if let Some(phone) = &draft.phone {
            entry.phone = Some(phone.clone());
        }
        if let Some(bio) = &draft.bio {
            entry.bio = Some(bio.clone());
        }
        if let Some(skills) = &draft.skills {
            entry.skills = Some(skills.clone());
        }
        if let Some(years) = draft.experience_years {
            entry.experience_years = Some(years);
        }
        if let Some(linkedin_url) = &draft.linkedin_url {
            entry.linkedin_url = Some(linkedin_url.clone());
        }
        if let Some(portfolio_url) = &draft.portfolio_url {
            entry.portfolio_url = Some(portfolio_url.clone());
        }
        if let Some(resume_url) = &draft.resume_url {
            entry.resume_url = Some(resume_url.clone());
        }
        Ok(entry.clone())
    }

    async fn find_company(&self, name: &str, owner_id: Uuid) -> Result<Option<Company>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .companies
            .iter()
            .find(|company| company.name == name && company.owner_id == owner_id)
            .cloned())
    }

    async fn create_company(&self, session: &Session, draft: &CompanyDraft) -> Result<Company> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        let company = Company {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            location: draft.location.clone(),
            owner_id: draft.owner_id,
            created_at: Some(Utc::now()),
        };
        inner.companies.push(company.clone());
        Ok(company)
    }

    async fn delete_company(&self, session: &Session, company_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        inner.companies.retain(|company| company.id != company_id);
        Ok(())
    }

    async fn list_jobs(&self) -> Result<Vec<JobPosting>> {
        let inner = self.inner.lock().await;
        let mut jobs = inner.jobs.clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPosting>> {
        let inner = self.inner.lock().await;
        Ok(inner.jobs.iter().find(|job| job.id == job_id).cloned())
    }

    async fn create_job(&self, session: &Session, draft: &JobPostingDraft) -> Result<JobPosting> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        let company_name = draft.company_id.and_then(|company_id| {
            inner
                .companies
                .iter()
                .find(|company| company.id == company_id)
                .map(|company| company.name.clone())
        });
        let job = JobPosting {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            employment_type: draft.employment_type.clone(),
            salary_range: draft.salary_range.clone(),
            company_id: draft.company_id,
            company_name,
            posted_by: draft.posted_by,
            created_at: Utc::now(),
        };
        inner.jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(
        &self,
        session: &Session,
        job_id: Uuid,
        draft: &JobPostingDraft,
    ) -> Result<JobPosting> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        let company_name = draft.company_id.and_then(|company_id| {
            inner
                .companies
                .iter()
                .find(|company| company.id == company_id)
                .map(|company| company.name.clone())
        });
        let Some(job) = inner.jobs.iter_mut().find(|job| job.id == job_id) else {
            return Err(Error::NotFound("Job posting not found".to_string()));
        };
        job.title = draft.title.clone();
        job.description = draft.description.clone();
        job.location = draft.location.clone();
        job.employment_type = draft.employment_type.clone();
        job.salary_range = draft.salary_range.clone();
        job.company_id = draft.company_id;
        job.company_name = company_name;
        Ok(job.clone())
    }

    async fn find_application(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicationRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .applications
            .iter()
            .find(|application| {
                application.job_id == job_id && application.applicant_id == applicant_id
            })
            .cloned())
    }

    async fn create_application(
        &self,
        session: &Session,
        draft: &ApplicationDraft,
    ) -> Result<ApplicationRecord> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        if inner.applications.iter().any(|application| {
            application.job_id == draft.job_id && application.applicant_id == draft.applicant_id
        }) {
            return Err(Error::Conflict {
                reason: "already_applied".to_string(),
            });
        }
        let record = ApplicationRecord {
            id: Uuid::new_v4(),
            job_id: draft.job_id,
            applicant_id: draft.applicant_id,
            cover_letter: draft.cover_letter.clone(),
            resume_url: draft.resume_url.clone(),
            status: draft.status,
            applied_at: Utc::now(),
        };
        inner.applications.push(record.clone());
        Ok(record)
    }

    async fn applications_for_owner(
        &self,
        session: &Session,
        owner_id: Uuid,
    ) -> Result<Vec<ReceivedApplication>> {
        let inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        let mut rows: Vec<ReceivedApplication> = inner
            .applications
            .iter()
            .filter_map(|application| {
                let job = inner.jobs.iter().find(|job| job.id == application.job_id)?;
                if job.posted_by != owner_id {
                    return None;
                }
                let applicant = inner
                    .users
                    .iter()
                    .find(|user| user.id == application.applicant_id);
                let profile = inner.profiles.get(&application.applicant_id);
                Some(ReceivedApplication {
                    id: application.id,
                    job_id: application.job_id,
                    job_title: job.title.clone(),
                    applicant_id: application.applicant_id,
                    applicant_name: applicant.map(|user| user.full_name.clone()),
                    applicant_email: applicant.map(|user| user.email.clone()),
                    applicant_phone: profile.and_then(|profile| profile.phone.clone()),
                    cover_letter: application.cover_letter.clone(),
                    resume_url: profile
                        .and_then(|profile| profile.resume_url.clone())
                        .or_else(|| application.resume_url.clone()),
                    status: application.status,
                    applied_at: application.applied_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(rows)
    }

    async fn upload_file(
        &self,
        session: &Session,
        path: &str,
        _bytes: Bytes,
        _content_type: &str,
    ) -> Result<String> {
        let mut inner = self.inner.lock().await;
        if !inner.sessions.contains_key(&session.access_token) {
            return Err(invalid_token());
        }
        inner.uploads.push(path.to_string());
        Ok(format!("https://files.example/{}", path))
    }
}
