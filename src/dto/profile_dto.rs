use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::profile::Profile;

/// Every field optional: only the ones sent are written. An empty full name
/// is skipped, not an error, matching the account page behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub experience_years: Option<i32>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: uuid::Uuid,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub experience_years: Option<i32>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeUploadResponse {
    pub resume_url: String,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            user_id: value.user_id,
            phone: value.phone,
            bio: value.bio,
            skills: value.skills,
            experience_years: value.experience_years,
            linkedin_url: value.linkedin_url,
            portfolio_url: value.portfolio_url,
            resume_url: value.resume_url,
        }
    }
}
