pub mod account_service;
pub mod application_service;
pub mod listing_service;
pub mod posting_service;
