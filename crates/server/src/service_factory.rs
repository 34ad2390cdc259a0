use licitacoes_core::{
    adapters::{config::app_config::AppConfig, sheets::spreadsheet_manager::SpreadsheetManager},
    ports::row_store::RowStore,
    CredentialsStore, LicitacaoService, RecordService,
};

use error_stack::ResultExt;
use std::sync::Arc;
use thiserror::Error;

use crate::http_adapter::HttpAdapter;

#[derive(Error, Debug)]
pub enum ServiceFactoryError {
    #[error("Invalid sheet layout")]
    InvalidLayout,
    #[error("Failed to create the spreadsheet client")]
    RowStore,
}

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create(config: &AppConfig) -> error_stack::Result<HttpAdapter, ServiceFactoryError> {
        let row_store: Arc<dyn RowStore> =
            Arc::new(SpreadsheetManager::new().change_context(ServiceFactoryError::RowStore)?);

        let parent = config
            .sheets
            .parent
            .layout()
            .change_context(ServiceFactoryError::InvalidLayout)?;
        let child = config
            .sheets
            .child
            .layout()
            .change_context(ServiceFactoryError::InvalidLayout)?;

        let records: Arc<dyn RecordService> = Arc::new(
            LicitacaoService::new(Arc::clone(&row_store), parent, child)
                .keep_omitted_fields(config.write.merge_omitted_fields),
        );
        let credentials = Arc::new(CredentialsStore::new());

        Ok(HttpAdapter::new(
            records,
            credentials,
            config.server.base_path.clone(),
        ))
    }
}
