//! Listing filter engine. Pure: (postings, spec) in, matched subset plus
//! counts out. Safe to call on every keystroke of a search box.

use serde::{Deserialize, Serialize};

use crate::models::job::{EmploymentType, JobPosting};

/// Active constraints for a listing query. Unset fields impose nothing, so
/// the default spec matches everything.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub search: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub location: Option<String>,
    pub salary_bucket: Option<SalaryBucket>,
}

/// Salary ranges offered by the listing page, matched against the first run
/// of digits in the free-text salary field. Boundaries are inclusive on both
/// ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalaryBucket {
    #[serde(rename = "0-5")]
    UpToFive,
    #[serde(rename = "5-10")]
    FiveToTen,
    #[serde(rename = "10-15")]
    TenToFifteen,
    #[serde(rename = "15+")]
    FifteenPlus,
}

impl SalaryBucket {
    /// Parses a query token. Unknown tokens degrade to no constraint, never
    /// an error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0-5" => Some(Self::UpToFive),
            "5-10" => Some(Self::FiveToTen),
            "10-15" => Some(Self::TenToFifteen),
            "15+" => Some(Self::FifteenPlus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpToFive => "0-5",
            Self::FiveToTen => "5-10",
            Self::TenToFifteen => "10-15",
            Self::FifteenPlus => "15+",
        }
    }

    fn contains(self, amount: u64) -> bool {
        match self {
            Self::UpToFive => amount <= 5,
            Self::FiveToTen => (5..=10).contains(&amount),
            Self::TenToFifteen => (10..=15).contains(&amount),
            Self::FifteenPlus => amount >= 15,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterOutcome {
    pub matched: Vec<JobPosting>,
    pub matched_count: usize,
    pub total_count: usize,
}

/// Applies every active predicate (logical AND) over the postings, preserving
/// input order.
pub fn filter_listings(postings: Vec<JobPosting>, spec: &FilterSpec) -> FilterOutcome {
    let total_count = postings.len();
    let search = normalize(spec.search.as_deref());
    let location = normalize(spec.location.as_deref());

    let matched: Vec<JobPosting> = postings
        .into_iter()
        .filter(|posting| {
            matches_search(posting, search.as_deref())
                && matches_employment_type(posting, spec.employment_type)
                && matches_location(posting, location.as_deref())
                && matches_salary(posting, spec.salary_bucket)
        })
        .collect();

    FilterOutcome {
        matched_count: matched.len(),
        total_count,
        matched,
    }
}

fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase)
}

fn matches_search(posting: &JobPosting, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    posting.title.to_lowercase().contains(needle)
        || posting.description.to_lowercase().contains(needle)
        || posting
            .location
            .as_deref()
            .map(|location| location.to_lowercase().contains(needle))
            .unwrap_or(false)
}

fn matches_employment_type(posting: &JobPosting, wanted: Option<EmploymentType>) -> bool {
    let Some(wanted) = wanted else {
        return true;
    };
    posting
        .employment_type
        .as_deref()
        .and_then(EmploymentType::parse)
        == Some(wanted)
}

fn matches_location(posting: &JobPosting, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    posting
        .location
        .as_deref()
        .map(|location| location.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn matches_salary(posting: &JobPosting, bucket: Option<SalaryBucket>) -> bool {
    let Some(bucket) = bucket else {
        return true;
    };
    let Some(text) = posting
        .salary_range
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
    else {
        // Nothing stated at all fails an active salary filter.
        return false;
    };
    match first_number(text) {
        Some(amount) => bucket.contains(amount),
        // Free text without digits ("competitive") matches every bucket.
        None => true,
    }
}

fn first_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
