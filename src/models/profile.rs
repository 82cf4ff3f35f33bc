use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extended account data keyed by user id, upserted from the account page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub experience_years: Option<i32>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub resume_url: Option<String>,
}

/// Partial profile write. Absent fields are left untouched by the upsert, so
/// a resume sync cannot wipe the rest of the profile.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileDraft {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

impl ProfileDraft {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}
