use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A company owned by the user who first posted under its name. Resolution is
/// find-or-create on (name, owner_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub owner_id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDraft {
    pub name: String,
    pub location: Option<String>,
    pub owner_id: Uuid,
}
