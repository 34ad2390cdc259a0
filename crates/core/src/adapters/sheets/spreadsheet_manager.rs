use error_stack::{report, ResultExt};
use google_sheets4::{api::ValueRange, client::NoToken, Sheets};
use std::fmt::Debug;
use tracing::instrument;

use crate::domain::{sheets::a1_notation::A1Notation, SheetsCredentials};
use crate::ports::row_store::{RowStore, RowStoreError};

use super::{
    http_client::{self, HttpsConnector},
    value_range_factory::ValueRangeFactory,
};

/// Google Sheets values API. The hub is shared by every request; which spreadsheet to touch and
/// which API key to send come with each call.
pub struct SpreadsheetManager {
    hub: Sheets<HttpsConnector>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager")
    }
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub fn new() -> error_stack::Result<Self, RowStoreError> {
        let client = http_client::http_client()
            .map_err(|error| report!(RowStoreError::FailedToBuildClient(error.to_string())))?;
        // API keys travel as the `key` query parameter, not as a bearer token.
        let hub = Sheets::new(client, NoToken);
        Ok(SpreadsheetManager { hub })
    }
}

#[async_trait::async_trait]
impl RowStore for SpreadsheetManager {
    #[instrument(skip(self, credentials), fields(spreadsheet_id = %credentials.spreadsheet_id, range = %range))]
    async fn get_range(
        &self,
        credentials: &SheetsCredentials,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<Vec<String>>, RowStoreError> {
        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&credentials.spreadsheet_id, range.as_ref())
            .param("key", &*credentials.api_key)
            .doit()
            .await
            .map_err(|error| report!(RowStoreError::fetch(range, error.to_string())))
            .attach_printable_lazy(|| format!("Failed to fetch values for range {}", range))?;

        Ok(value_range.into_rows())
    }

    #[instrument(skip(self, credentials, rows), fields(spreadsheet_id = %credentials.spreadsheet_id, range = %range))]
    async fn put_range(
        &self,
        credentials: &SheetsCredentials,
        range: &A1Notation,
        rows: Vec<Vec<String>>,
    ) -> error_stack::Result<(), RowStoreError> {
        self.hub
            .spreadsheets()
            .values_update(
                ValueRange::from_rows(rows),
                &credentials.spreadsheet_id,
                range.as_ref(),
            )
            .value_input_option("RAW")
            .param("key", &*credentials.api_key)
            .doit()
            .await
            .map(|_| ())
            .map_err(|error| report!(RowStoreError::write(range, error.to_string())))
            .attach_printable_lazy(|| format!("Failed to write to range {}", range))
    }
}
