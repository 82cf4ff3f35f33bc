//! Supabase-backed [`StorageBackend`]: GoTrue for auth, PostgREST for rows,
//! the Storage API for resume files. Every request carries the project anon
//! key; row requests additionally carry the caller's access token when one
//! exists so row-level security sees the real user.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationDraft, ApplicationRecord, ApplicationStatus, ReceivedApplication,
};
use crate::models::company::{Company, CompanyDraft};
use crate::models::job::{JobPosting, JobPostingDraft};
use crate::models::profile::{Profile, ProfileDraft};
use crate::models::user::{
    AuthenticatedUser, Identity, NewUser, Session, SessionTokens, SignUpOutcome, User,
};
use crate::storage::StorageBackend;

const JOB_SELECT: &str = "*,companies(name,location)";
const RECEIVED_SELECT: &str =
    "*,jobs!inner(id,title,posted_by),users!applications_applicant_id_fkey(id,full_name,email)";

#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
    bucket: String,
}

impl SupabaseStore {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.supabase_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|_| Error::Config("SUPABASE_URL is not a valid URL".to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::Config(
                "SUPABASE_URL must use http or https".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            anon_key: config.supabase_anon_key.clone(),
            bucket: config.supabase_bucket.clone(),
        })
    }

    fn rest(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: String, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn ensure_success(&self, response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!("Supabase request failed ({}): {} {}", context, status, body);
        let message = extract_message(&body);
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Unauthorized(message.unwrap_or_else(|| "invalid_token".to_string()))
            }
            StatusCode::NOT_FOUND => Error::NotFound(context.to_string()),
            StatusCode::CONFLICT => Error::Conflict {
                reason: message.unwrap_or_else(|| "duplicate".to_string()),
            },
            _ => Error::Collaborator(format!("{} returned {}", context, status)),
        })
    }
}

/// Pulls a human-readable message out of a GoTrue or PostgREST error body.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["error_description", "msg", "message", "error"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
}

/// GoTrue answers a signup with either a full session or, when email
/// confirmation is on, a bare user object. All fields optional so one shape
/// covers both.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<GoTrueUser>,
    id: Option<Uuid>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: GoTrueUser,
}

#[derive(Debug, Deserialize)]
struct CompanyEmbed {
    name: String,
}

#[derive(Debug, Deserialize)]
struct JobRow {
    id: Uuid,
    title: String,
    description: String,
    location: Option<String>,
    employment_type: Option<String>,
    salary_range: Option<String>,
    company_id: Option<Uuid>,
    posted_by: Uuid,
    created_at: DateTime<Utc>,
    companies: Option<CompanyEmbed>,
}

impl From<JobRow> for JobPosting {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            employment_type: row.employment_type,
            salary_range: row.salary_range,
            company_id: row.company_id,
            company_name: row.companies.map(|company| company.name),
            posted_by: row.posted_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobEmbed {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApplicantEmbed {
    full_name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReceivedRow {
    id: Uuid,
    job_id: Uuid,
    applicant_id: Uuid,
    cover_letter: Option<String>,
    resume_url: Option<String>,
    #[serde(default)]
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
    jobs: Option<JobEmbed>,
    users: Option<ApplicantEmbed>,
}

#[derive(Debug, Deserialize)]
struct ProfileContactRow {
    user_id: Uuid,
    phone: Option<String>,
    resume_url: Option<String>,
}

#[async_trait]
impl StorageBackend for SupabaseStore {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let response = self
            .request(Method::POST, self.auth("signup"), None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Sign up failed: {} {}", status, body);
            let message = extract_message(&body);
            let already = message
                .as_deref()
                .map(|m| m.to_lowercase().contains("already"))
                .unwrap_or(false);
            return Err(if already || status == StatusCode::CONFLICT {
                Error::Conflict {
                    reason: "user_already_registered".to_string(),
                }
            } else {
                Error::BadRequest(message.unwrap_or_else(|| "Sign up failed".to_string()))
            });
        }

        let body = response.json::<SignUpResponse>().await?;
        let user_id = body
            .user
            .as_ref()
            .map(|user| user.id)
            .or(body.id)
            .ok_or_else(|| Error::Collaborator("sign up response missing user id".to_string()))?;
        let email = body
            .user
            .as_ref()
            .and_then(|user| user.email.clone())
            .or(body.email)
            .unwrap_or_else(|| email.to_string());
        let session = body.access_token.map(|access_token| SessionTokens {
            access_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
        });

        Ok(SignUpOutcome {
            user_id,
            email,
            session,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
        let url = format!("{}?grant_type=password", self.auth("token"));
        let response = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_message(&body)
                .unwrap_or_else(|| "Invalid login credentials".to_string());
            return Err(Error::Unauthorized(message));
        }

        let session = response.json::<GoTrueSession>().await?;
        Ok(AuthenticatedUser {
            user_id: session.user.id,
            email: session
                .user
                .email
                .unwrap_or_else(|| email.to_string()),
            tokens: SessionTokens {
                access_token: session.access_token,
                refresh_token: session.refresh_token,
                expires_in: session.expires_in,
            },
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        let response = self
            .request(Method::POST, self.auth("recover"), None)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        self.ensure_success(response, "password recovery").await?;
        Ok(())
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<()> {
        let response = self
            .request(Method::PUT, self.auth("user"), Some(&session.access_token))
            .json(&json!({ "password": new_password }))
            .send()
            .await?;
        self.ensure_success(response, "password update").await?;
        Ok(())
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let response = self
            .request(
                Method::POST,
                self.auth("logout"),
                Some(&session.access_token),
            )
            .send()
            .await?;
        self.ensure_success(response, "sign out").await?;
        Ok(())
    }

    async fn current_identity(&self, access_token: &str) -> Result<Identity> {
        let response = self
            .request(Method::GET, self.auth("user"), Some(access_token))
            .send()
            .await?;
        let response = self.ensure_success(response, "token introspection").await?;
        let user = response.json::<GoTrueUser>().await?;
        Ok(Identity {
            user_id: user.id,
            email: user.email.unwrap_or_default(),
        })
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let response = self
            .request(Method::POST, self.rest("users"), None)
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(user)
            .send()
            .await?;
        let response = self.ensure_success(response, "user insert").await?;
        let mut rows = response.json::<Vec<User>>().await?;
        rows.pop()
            .ok_or_else(|| Error::Collaborator("user insert returned no row".to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email_filter = format!("eq.{}", email);
        let response = self
            .request(Method::GET, self.rest("users"), None)
            .query(&[
                ("select", "*"),
                ("email", email_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let response = self.ensure_success(response, "user lookup").await?;
        let mut rows = response.json::<Vec<User>>().await?;
        Ok(rows.pop())
    }

    async fn update_full_name(&self, session: &Session, full_name: &str) -> Result<()> {
        let email_filter = format!("eq.{}", session.email);
        let response = self
            .request(
                Method::PATCH,
                self.rest("users"),
                Some(&session.access_token),
            )
            .query(&[("email", email_filter.as_str())])
            .json(&json!({ "full_name": full_name }))
            .send()
            .await?;
        self.ensure_success(response, "user update").await?;
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let user_filter = format!("eq.{}", user_id);
        let response = self
            .request(Method::GET, self.rest("profiles"), None)
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let response = self.ensure_success(response, "profile lookup").await?;
        let mut rows = response.json::<Vec<Profile>>().await?;
        Ok(rows.pop())
    }

    async fn upsert_profile(&self, session: &Session, draft: &ProfileDraft) -> Result<Profile> {
        let response = self
            .request(
                Method::POST,
                self.rest("profiles"),
                Some(&session.access_token),
            )
            .query(&[("on_conflict", "user_id"), ("select", "*")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(draft)
            .send()
            .await?;
        let response = self.ensure_success(response, "profile upsert").await?;
        let mut rows = response.json::<Vec<Profile>>().await?;
        rows.pop()
            .ok_or_else(|| Error::Collaborator("profile upsert returned no row".to_string()))
    }

    async fn find_company(&self, name: &str, owner_id: Uuid) -> Result<Option<Company>> {
        let name_filter = format!("eq.{}", name);
        let owner_filter = format!("eq.{}", owner_id);
        let response = self
            .request(Method::GET, self.rest("companies"), None)
            .query(&[
                ("select", "*"),
                ("name", name_filter.as_str()),
                ("owner_id", owner_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let response = self.ensure_success(response, "company lookup").await?;
        let mut rows = response.json::<Vec<Company>>().await?;
        Ok(rows.pop())
    }

    async fn create_company(&self, session: &Session, draft: &CompanyDraft) -> Result<Company> {
        let response = self
            .request(
                Method::POST,
                self.rest("companies"),
                Some(&session.access_token),
            )
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(draft)
            .send()
            .await?;
        let response = self.ensure_success(response, "company insert").await?;
        let mut rows = response.json::<Vec<Company>>().await?;
        rows.pop()
            .ok_or_else(|| Error::Collaborator("company insert returned no row".to_string()))
    }

    async fn delete_company(&self, session: &Session, company_id: Uuid) -> Result<()> {
        let id_filter = format!("eq.{}", company_id);
        let response = self
            .request(
                Method::DELETE,
                self.rest("companies"),
                Some(&session.access_token),
            )
            .query(&[("id", id_filter.as_str())])
            .send()
            .await?;
        self.ensure_success(response, "company delete").await?;
        Ok(())
    }

    async fn list_jobs(&self) -> Result<Vec<JobPosting>> {
        let response = self
            .request(Method::GET, self.rest("jobs"), None)
            .query(&[("select", JOB_SELECT), ("order", "created_at.desc")])
            .send()
            .await?;
        let response = self.ensure_success(response, "job listing").await?;
        let rows = response.json::<Vec<JobRow>>().await?;
        Ok(rows.into_iter().map(JobPosting::from).collect())
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPosting>> {
        let id_filter = format!("eq.{}", job_id);
        let response = self
            .request(Method::GET, self.rest("jobs"), None)
            .query(&[
                ("select", JOB_SELECT),
                ("id", id_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let response = self.ensure_success(response, "job lookup").await?;
        let mut rows = response.json::<Vec<JobRow>>().await?;
        Ok(rows.pop().map(JobPosting::from))
    }

    async fn create_job(&self, session: &Session, draft: &JobPostingDraft) -> Result<JobPosting> {
        let response = self
            .request(Method::POST, self.rest("jobs"), Some(&session.access_token))
            .query(&[("select", JOB_SELECT)])
            .header("Prefer", "return=representation")
            .json(draft)
            .send()
            .await?;
        let response = self.ensure_success(response, "job insert").await?;
        let mut rows = response.json::<Vec<JobRow>>().await?;
        rows.pop()
            .map(JobPosting::from)
            .ok_or_else(|| Error::Collaborator("job insert returned no row".to_string()))
    }

    async fn update_job(
        &self,
        session: &Session,
        job_id: Uuid,
        draft: &JobPostingDraft,
    ) -> Result<JobPosting> {
        let id_filter = format!("eq.{}", job_id);
        // posted_by is never rewritten, ownership is fixed at creation.
        let response = self
            .request(
                Method::PATCH,
                self.rest("jobs"),
                Some(&session.access_token),
            )
            .query(&[("id", id_filter.as_str()), ("select", JOB_SELECT)])
            .header("Prefer", "return=representation")
            .json(&json!({
                "title": draft.title,
                "description": draft.description,
                "location": draft.location,
                "employment_type": draft.employment_type,
                "salary_range": draft.salary_range,
                "company_id": draft.company_id,
            }))
            .send()
            .await?;
        let response = self.ensure_success(response, "job update").await?;
        let mut rows = response.json::<Vec<JobRow>>().await?;
        rows.pop()
            .map(JobPosting::from)
            .ok_or_else(|| Error::NotFound("Job posting not found".to_string()))
    }

    async fn find_application(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicationRecord>> {
        let job_filter = format!("eq.{}", job_id);
        let applicant_filter = format!("eq.{}", applicant_id);
        let response = self
            .request(Method::GET, self.rest("applications"), None)
            .query(&[
                ("select", "*"),
                ("job_id", job_filter.as_str()),
                ("applicant_id", applicant_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let response = self.ensure_success(response, "application lookup").await?;
        let mut rows = response.json::<Vec<ApplicationRecord>>().await?;
        Ok(rows.pop())
    }

    async fn create_application(
        &self,
        session: &Session,
        draft: &ApplicationDraft,
    ) -> Result<ApplicationRecord> {
        let response = self
            .request(
                Method::POST,
                self.rest("applications"),
                Some(&session.access_token),
            )
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(draft)
            .send()
            .await?;
        let response = match self.ensure_success(response, "application insert").await {
            // The unique index on (job_id, applicant_id) is the authoritative
            // duplicate check behind the service-level pre-check.
            Err(Error::Conflict { .. }) => {
                return Err(Error::Conflict {
                    reason: "already_applied".to_string(),
                })
            }
            other => other?,
        };
        let mut rows = response.json::<Vec<ApplicationRecord>>().await?;
        rows.pop()
            .ok_or_else(|| Error::Collaborator("application insert returned no row".to_string()))
    }

    async fn applications_for_owner(
        &self,
        session: &Session,
        owner_id: Uuid,
    ) -> Result<Vec<ReceivedApplication>> {
        let owner_filter = format!("eq.{}", owner_id);
        let response = self
            .request(
                Method::GET,
                self.rest("applications"),
                Some(&session.access_token),
            )
            .query(&[
                ("select", RECEIVED_SELECT),
                ("jobs.posted_by", owner_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;
        let response = self.ensure_success(response, "received applications").await?;
        let rows = response.json::<Vec<ReceivedRow>>().await?;

        // Second fetch pulls applicant phones and canonical resume URLs.
        let mut applicant_ids: Vec<Uuid> = rows.iter().map(|row| row.applicant_id).collect();
        applicant_ids.sort();
        applicant_ids.dedup();

        let mut contacts: HashMap<Uuid, ProfileContactRow> = HashMap::new();
        if !applicant_ids.is_empty() {
            let id_list = applicant_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let in_filter = format!("in.({})", id_list);
            let response = self
                .request(
                    Method::GET,
                    self.rest("profiles"),
                    Some(&session.access_token),
                )
                .query(&[
                    ("select", "user_id,phone,resume_url"),
                    ("user_id", in_filter.as_str()),
                ])
                .send()
                .await?;
            let response = self.ensure_success(response, "applicant profiles").await?;
            let profiles = response.json::<Vec<ProfileContactRow>>().await?;
            contacts = profiles
                .into_iter()
                .map(|profile| (profile.user_id, profile))
                .collect();
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let contact = contacts.get(&row.applicant_id);
                ReceivedApplication {
                    id: row.id,
                    job_id: row.job_id,
                    job_title: row
                        .jobs
                        .map(|job| job.title)
                        .unwrap_or_else(|| "Unknown Job".to_string()),
                    applicant_id: row.applicant_id,
                    applicant_name: row.users.as_ref().and_then(|user| user.full_name.clone()),
                    applicant_email: row.users.as_ref().and_then(|user| user.email.clone()),
                    applicant_phone: contact.and_then(|profile| profile.phone.clone()),
                    cover_letter: row.cover_letter,
                    resume_url: contact
                        .and_then(|profile| profile.resume_url.clone())
                        .or(row.resume_url),
                    status: row.status,
                    applied_at: row.created_at,
                }
            })
            .collect())
    }

    async fn upload_file(
        &self,
        session: &Session,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);
        let response = self
            .request(Method::POST, url, Some(&session.access_token))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        self.ensure_success(response, "file upload").await?;

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        ))
    }
}
