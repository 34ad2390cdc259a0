use error_stack::ResultExt;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    records::{Record, RecordFields},
    sheets::{a1_notation::A1Notation, row::Row, sheet_range::SheetRange, table::SheetTable},
    SheetsCredentials,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowStoreError {
    #[error("Failed to fetch range {range}: {message}")]
    FailedToFetchRange { range: String, message: String },
    #[error("Failed to write range {range}: {message}")]
    FailedToWriteRange { range: String, message: String },
    #[error("Failed to build the HTTP client: {0}")]
    FailedToBuildClient(String),
}

impl RowStoreError {
    pub fn fetch<S: Into<String>>(range: &A1Notation, message: S) -> Self {
        RowStoreError::FailedToFetchRange {
            range: range.to_string(),
            message: message.into(),
        }
    }

    pub fn write<S: Into<String>>(range: &A1Notation, message: S) -> Self {
        RowStoreError::FailedToWriteRange {
            range: range.to_string(),
            message: message.into(),
        }
    }

    /// What the external store said, without our framing.
    pub fn upstream_message(&self) -> &str {
        match self {
            RowStoreError::FailedToFetchRange { message, .. }
            | RowStoreError::FailedToWriteRange { message, .. }
            | RowStoreError::FailedToBuildClient(message) => message,
        }
    }
}

/// Range-level access to the external tabular store.
#[async_trait::async_trait]
pub trait RowStore: Send + Sync {
    /// Reads every cell of `range`, row by row. A range with no values yields no rows.
    async fn get_range(
        &self,
        credentials: &SheetsCredentials,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<Vec<String>>, RowStoreError>;

    /// Replaces the cells of `range` with `rows`.
    async fn put_range(
        &self,
        credentials: &SheetsCredentials,
        range: &A1Notation,
        rows: Vec<Vec<String>>,
    ) -> error_stack::Result<(), RowStoreError>;

    /// Reads a sheet's record columns and splits off the header line.
    #[instrument(skip(self, credentials), fields(sheet = %sheet))]
    async fn fetch_table(
        &self,
        credentials: &SheetsCredentials,
        sheet: &SheetRange,
    ) -> error_stack::Result<SheetTable, RowStoreError> {
        let cells = self.get_range(credentials, &sheet.full()).await?;
        let table = SheetTable::from_cells(cells);
        tracing::debug!(
            headers = table.headers().len(),
            rows = table.len(),
            "Fetched sheet"
        );
        Ok(table)
    }

    /// Every record of a sheet, in storage order.
    async fn fetch_rows(
        &self,
        credentials: &SheetsCredentials,
        sheet: &SheetRange,
    ) -> error_stack::Result<Vec<Record>, RowStoreError> {
        Ok(self.fetch_table(credentials, sheet).await?.records())
    }

    /// Writes `fields` over `row`, header by header. See [`SheetTable::overwrite_cells`] for
    /// what happens to headers the caller left out.
    #[instrument(skip(self, credentials, table, fields), fields(sheet = %sheet, row = %row))]
    async fn overwrite_row(
        &self,
        credentials: &SheetsCredentials,
        sheet: &SheetRange,
        table: &SheetTable,
        row: Row,
        fields: &RecordFields,
        keep_omitted: bool,
    ) -> error_stack::Result<(), RowStoreError> {
        let cells = table.overwrite_cells(row, fields, keep_omitted);
        let range = sheet.row(row, cells.len());
        self.put_range(credentials, &range, vec![cells])
            .await
            .attach_printable_lazy(|| format!("Overwriting row {} of {}", row, sheet.name))
    }
}
