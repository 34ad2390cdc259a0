use std::sync::Arc;

use error_stack::report;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::SheetsCredentials;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Spreadsheet credentials have not been configured")]
    NotConfigured,
    #[error("Both apiKey and spreadsheetId are required")]
    MissingField { field: &'static str },
}

/// What `GET /config` reports. Never carries the API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsStatus {
    pub configured: bool,
    pub spreadsheet_id: String,
}

/// Holds the credentials set at runtime. Callers take one snapshot per request and keep using
/// it, so a reconfiguration mid-request never mixes two configurations.
#[derive(Debug, Default)]
pub struct CredentialsStore {
    current: RwLock<Option<Arc<SheetsCredentials>>>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, CredentialsError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or(CredentialsError::MissingField { field })
}

impl CredentialsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the credentials as a whole. Nothing changes unless both fields are present.
    #[instrument(skip(self, api_key))]
    pub async fn configure(
        &self,
        api_key: Option<String>,
        spreadsheet_id: Option<String>,
    ) -> error_stack::Result<(), CredentialsError> {
        let api_key = required(api_key, "apiKey")?;
        let spreadsheet_id = required(spreadsheet_id, "spreadsheetId")?;

        let credentials = Arc::new(SheetsCredentials::new(api_key, spreadsheet_id));
        let previous = self.current.write().await.replace(credentials);
        if previous.is_some() {
            tracing::info!("Spreadsheet credentials replaced");
        } else {
            tracing::info!("Spreadsheet credentials configured");
        }
        Ok(())
    }

    pub async fn snapshot(&self) -> error_stack::Result<Arc<SheetsCredentials>, CredentialsError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or_else(|| report!(CredentialsError::NotConfigured))
    }

    pub async fn status(&self) -> CredentialsStatus {
        match self.current.read().await.as_ref() {
            Some(credentials) => CredentialsStatus {
                configured: true,
                spreadsheet_id: credentials.spreadsheet_id.to_string(),
            },
            None => CredentialsStatus {
                configured: false,
                spreadsheet_id: String::new(),
            },
        }
    }
}
