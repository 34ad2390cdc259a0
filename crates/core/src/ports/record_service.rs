use thiserror::Error;

use crate::domain::{
    records::{Record, RecordFields},
    sheets::row::Row,
    SheetsCredentials,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordServiceError {
    #[error("Spreadsheet request failed: {message}")]
    Upstream { message: String },
    #[error("Invalid request: {details}")]
    Validation { details: String },
}

impl RecordServiceError {
    pub fn validation<S: Into<String>>(details: S) -> Self {
        RecordServiceError::Validation {
            details: details.into(),
        }
    }
}

/// Result of an update. A missing record is an expected answer, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { row: Row },
    NotFound,
}

/// The four operations the review UI needs. Every call runs against the credentials snapshot
/// it is given and reads the sheet afresh.
#[async_trait::async_trait]
pub trait RecordService: Send + Sync {
    async fn list_parents(
        &self,
        credentials: &SheetsCredentials,
    ) -> error_stack::Result<Vec<Record>, RecordServiceError>;

    /// Children of `parent_key`, ordered by the numeric value of their ordinal.
    async fn list_children(
        &self,
        credentials: &SheetsCredentials,
        parent_key: &str,
    ) -> error_stack::Result<Vec<Record>, RecordServiceError>;

    async fn update_parent(
        &self,
        credentials: &SheetsCredentials,
        parent_key: &str,
        fields: &RecordFields,
    ) -> error_stack::Result<UpdateOutcome, RecordServiceError>;

    /// `ordinal` is compared as text, so `"007"` and `"7"` are different items.
    async fn update_child(
        &self,
        credentials: &SheetsCredentials,
        parent_key: &str,
        ordinal: &str,
        fields: &RecordFields,
    ) -> error_stack::Result<UpdateOutcome, RecordServiceError>;
}
