use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::dto::application_dto::ResumeFile;
use crate::dto::auth_dto::{
    ChangePasswordPayload, LoginPayload, RegisterPayload, ResetPasswordPayload,
};
use crate::dto::profile_dto::UpdateProfilePayload;
use crate::error::Result;
use crate::models::profile::{Profile, ProfileDraft};
use crate::models::user::{AuthenticatedUser, NewUser, Session, SignUpOutcome, User};
use crate::services::application_service::validate_resume;
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn StorageBackend>,
}

pub struct AccountOverview {
    pub user: Option<User>,
    pub profile: Option<Profile>,
}

impl AccountService {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    /// Signs the account up, then seeds the users row and profile. The auth
    /// identity is the source of truth: once it exists, seeding failures only
    /// log, a later profile write repairs them.
    pub async fn register(&self, payload: RegisterPayload) -> Result<SignUpOutcome> {
        let outcome = self
            .store
            .sign_up(&payload.email, &payload.password)
            .await?;

        let user = NewUser {
            id: outcome.user_id,
            full_name: payload.full_name.trim().to_string(),
            email: outcome.email.clone(),
            role: "user".to_string(),
        };
        if let Err(err) = self.store.create_user(&user).await {
            warn!("User row creation failed for {}: {}", outcome.user_id, err);
        }

        // With confirmation pending there is no session to write with; the
        // first authenticated upsert creates the profile instead.
        if let Some(session) = outcome.session_context() {
            let mut draft = ProfileDraft::for_user(outcome.user_id);
            draft.phone = payload
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
            draft.bio = Some(String::new());
            draft.skills = Some(String::new());
            draft.experience_years = Some(0);
            if let Err(err) = self.store.upsert_profile(&session, &draft).await {
                warn!("Profile seeding failed for {}: {}", outcome.user_id, err);
            }
        }

        Ok(outcome)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<(AuthenticatedUser, Option<User>)> {
        let authenticated = self
            .store
            .sign_in(&payload.email, &payload.password)
            .await?;
        let user = match self.store.find_user_by_email(&authenticated.email).await {
            Ok(user) => user,
            Err(err) => {
                warn!("User row lookup failed after login: {}", err);
                None
            }
        };
        Ok((authenticated, user))
    }

    /// Revokes the caller's session upstream. Clients drop their copy of the
    /// tokens either way.
    pub async fn logout(&self, session: &Session) -> Result<()> {
        self.store.sign_out(session).await
    }

    /// Always answers generically so the endpoint cannot be used to probe
    /// which addresses exist.
    pub async fn reset_password(&self, payload: ResetPasswordPayload) -> Result<()> {
        self.store.send_password_reset(&payload.email).await
    }

    pub async fn change_password(
        &self,
        session: &Session,
        payload: ChangePasswordPayload,
    ) -> Result<()> {
        self.store
            .update_password(session, &payload.new_password)
            .await
    }

    pub async fn me(&self, session: &Session) -> Result<AccountOverview> {
        let user = self.store.find_user_by_email(&session.email).await?;
        let profile = self.store.get_profile(session.user_id).await?;
        Ok(AccountOverview { user, profile })
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        payload: UpdateProfilePayload,
    ) -> Result<Profile> {
        // A blank full name is skipped, not an error.
        if let Some(full_name) = payload
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            self.store.update_full_name(session, full_name).await?;
        }

        let mut draft = ProfileDraft::for_user(session.user_id);
        draft.phone = payload.phone;
        draft.bio = payload.bio;
        draft.skills = payload.skills;
        draft.experience_years = payload.experience_years;
        draft.linkedin_url = payload.linkedin_url;
        draft.portfolio_url = payload.portfolio_url;
        self.store.upsert_profile(session, &draft).await
    }

    /// Same PDF and size rules as an application resume, but stored from the
    /// account page and written straight onto the profile.
    pub async fn upload_resume(
        &self,
        session: &Session,
        file: Option<ResumeFile>,
    ) -> Result<String> {
        let file = validate_resume(file.as_ref())?;

        let path = format!(
            "resumes/{}_{}_{}",
            session.user_id,
            Utc::now().timestamp_millis(),
            file.filename
        );
        let resume_url = self
            .store
            .upload_file(session, &path, file.bytes.clone(), &file.content_type)
            .await?;

        let mut draft = ProfileDraft::for_user(session.user_id);
        draft.resume_url = Some(resume_url.clone());
        self.store.upsert_profile(session, &draft).await?;

        Ok(resume_url)
    }
}
