pub mod record_service;
pub mod row_store;
