use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved caller identity from the auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Explicit per-request context threaded through every authenticated
/// operation. Produced by the auth middleware; never ambient.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: String,
}

/// Row in the application's own `users` table. The id mirrors the auth
/// identity id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Result of delegated sign-up. When the platform requires email confirmation
/// there is no session yet.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user_id: Uuid,
    pub email: String,
    pub session: Option<SessionTokens>,
}

/// Result of a successful password-grant sign-in.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub tokens: SessionTokens,
}

impl SignUpOutcome {
    pub fn session_context(&self) -> Option<Session> {
        self.session.as_ref().map(|tokens| Session {
            access_token: tokens.access_token.clone(),
            user_id: self.user_id,
            email: self.email.clone(),
        })
    }
}

impl AuthenticatedUser {
    pub fn session_context(&self) -> Session {
        Session {
            access_token: self.tokens.access_token.clone(),
            user_id: self.user_id,
            email: self.email.clone(),
        }
    }
}
