use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job posting as stored by the collaborator. `employment_type` stays a raw
/// string: postings carrying a token outside the known set are displayed
/// verbatim rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary_range: Option<String>,
    pub company_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Shaped fields for inserting or replacing a posting.
#[derive(Debug, Clone, Serialize)]
pub struct JobPostingDraft {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary_range: Option<String>,
    pub company_id: Option<Uuid>,
    pub posted_by: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Internship,
    Contract,
}

impl EmploymentType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "full_time" => Some(Self::FullTime),
            "part_time" => Some(Self::PartTime),
            "internship" => Some(Self::Internship),
            "contract" => Some(Self::Contract),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::Internship => "internship",
            Self::Contract => "contract",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Internship => "Internship",
            Self::Contract => "Contract",
        }
    }
}

/// Display label for a raw employment-type token. Unknown tokens come back
/// verbatim.
pub fn employment_type_label(raw: &str) -> String {
    match EmploymentType::parse(raw) {
        Some(known) => known.label().to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tokens() {
        assert_eq!(EmploymentType::parse("full_time"), Some(EmploymentType::FullTime));
        assert_eq!(EmploymentType::parse("part_time"), Some(EmploymentType::PartTime));
        assert_eq!(EmploymentType::parse("internship"), Some(EmploymentType::Internship));
        assert_eq!(EmploymentType::parse("contract"), Some(EmploymentType::Contract));
        assert_eq!(EmploymentType::parse("freelance"), None);
        assert_eq!(EmploymentType::parse("Full_Time"), None);
    }

    #[test]
    fn labels_known_tokens() {
        assert_eq!(employment_type_label("full_time"), "Full-time");
        assert_eq!(employment_type_label("contract"), "Contract");
    }

    #[test]
    fn unknown_token_labels_verbatim() {
        assert_eq!(employment_type_label("gig_economy"), "gig_economy");
    }
}
