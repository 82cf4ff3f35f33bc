pub mod config;
pub mod dto;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

use std::sync::Arc;

use crate::services::{
    account_service::AccountService, application_service::ApplicationService,
    listing_service::ListingService, posting_service::PostingService,
};
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StorageBackend>,
    pub listing_service: ListingService,
    pub posting_service: PostingService,
    pub application_service: ApplicationService,
    pub account_service: AccountService,
}

impl AppState {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        let listing_service = ListingService::new(store.clone());
        let posting_service = PostingService::new(store.clone());
        let application_service = ApplicationService::new(store.clone());
        let account_service = AccountService::new(store.clone());

        Self {
            store,
            listing_service,
            posting_service,
            application_service,
            account_service,
        }
    }
}
