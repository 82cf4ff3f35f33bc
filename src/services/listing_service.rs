use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::filter::{filter_listings, FilterOutcome, FilterSpec};
use crate::models::job::JobPosting;
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn StorageBackend>,
}

impl ListingService {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    /// Fetches the whole board and filters in process, so `total_count`
    /// always reflects every posting regardless of active constraints.
    pub async fn list(&self, spec: FilterSpec) -> Result<FilterOutcome> {
        let postings = self.store.list_jobs().await?;
        Ok(filter_listings(postings, &spec))
    }

    pub async fn get(&self, job_id: Uuid) -> Result<JobPosting> {
        self.store
            .get_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job posting not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockStorageBackend;
    use chrono::Utc;

    fn posting(title: &str) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "desc".to_string(),
            location: None,
            employment_type: None,
            salary_range: None,
            company_id: None,
            company_name: None,
            posted_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_filters_over_full_board() {
        let mut mock = MockStorageBackend::new();
        mock.expect_list_jobs()
            .returning(|| Ok(vec![posting("Backend Engineer"), posting("Designer")]));
        let service = ListingService::new(Arc::new(mock));

        let spec = FilterSpec {
            search: Some("backend".to_string()),
            ..FilterSpec::default()
        };
        let outcome = service.list(spec).await.unwrap();

        assert_eq!(outcome.matched_count, 1);
        assert_eq!(outcome.total_count, 2);
    }

    #[tokio::test]
    async fn get_missing_posting_is_not_found() {
        let mut mock = MockStorageBackend::new();
        mock.expect_get_job().returning(|_| Ok(None));
        let service = ListingService::new(Arc::new(mock));

        let err = service.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
