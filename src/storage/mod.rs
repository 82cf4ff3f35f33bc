pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{ApplicationDraft, ApplicationRecord, ReceivedApplication};
use crate::models::company::{Company, CompanyDraft};
use crate::models::job::{JobPosting, JobPostingDraft};
use crate::models::profile::{Profile, ProfileDraft};
use crate::models::user::{
    AuthenticatedUser, Identity, NewUser, Session, SignUpOutcome, User,
};

/// Everything the services need from the storage collaborator. The live
/// implementation talks to Supabase over REST; tests swap in [`memory::MemoryStore`]
/// or a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    // --- auth ---

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser>;

    async fn send_password_reset(&self, email: &str) -> Result<()>;

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<()>;

    /// Revokes the session upstream; the token stops resolving afterwards.
    async fn sign_out(&self, session: &Session) -> Result<()>;

    /// Resolves a bearer token to the account it belongs to.
    async fn current_identity(&self, access_token: &str) -> Result<Identity>;

    // --- users ---

    async fn create_user(&self, user: &NewUser) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn update_full_name(&self, session: &Session, full_name: &str) -> Result<()>;

    // --- profiles ---

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    /// Inserts or merges a profile row keyed by user id. Fields absent from
    /// the draft are left as they were.
    async fn upsert_profile(&self, session: &Session, draft: &ProfileDraft) -> Result<Profile>;

    // --- companies ---

    async fn find_company(&self, name: &str, owner_id: Uuid) -> Result<Option<Company>>;

    async fn create_company(&self, session: &Session, draft: &CompanyDraft) -> Result<Company>;

    async fn delete_company(&self, session: &Session, company_id: Uuid) -> Result<()>;

    // --- jobs ---

    /// All postings, newest first, with company names resolved.
    async fn list_jobs(&self) -> Result<Vec<JobPosting>>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPosting>>;

    async fn create_job(&self, session: &Session, draft: &JobPostingDraft) -> Result<JobPosting>;

    async fn update_job(
        &self,
        session: &Session,
        job_id: Uuid,
        draft: &JobPostingDraft,
    ) -> Result<JobPosting>;

    // --- applications ---

    async fn find_application(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicationRecord>>;

    async fn create_application(
        &self,
        session: &Session,
        draft: &ApplicationDraft,
    ) -> Result<ApplicationRecord>;

    /// Applications submitted to any posting owned by `owner_id`, newest
    /// first, flattened with applicant contact details.
    async fn applications_for_owner(
        &self,
        session: &Session,
        owner_id: Uuid,
    ) -> Result<Vec<ReceivedApplication>>;

    // --- files ---

    /// Uploads a file and returns its public URL.
    async fn upload_file(
        &self,
        session: &Session,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String>;
}
