pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod prettyprint;

// Re-export key types for easy access
pub use application::{
    credentials::{CredentialsError, CredentialsStatus, CredentialsStore},
    service::LicitacaoService,
};
pub use domain::{Record, RecordFields, SheetsCredentials};
pub use ports::{
    record_service::{RecordService, RecordServiceError, UpdateOutcome},
    row_store::{RowStore, RowStoreError},
};
