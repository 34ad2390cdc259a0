pub mod http_client;
#[cfg(any(test, feature = "testing"))]
pub mod in_memory_row_store;
pub mod spreadsheet_manager;
pub mod value_range_factory;
