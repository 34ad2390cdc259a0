use std::sync::Arc;

use error_stack::Report;
use hyper::{Body, Request, Response, StatusCode};
use licitacoes_core::{
    CredentialsError, CredentialsStore, RecordFields, RecordService, RecordServiceError,
    UpdateOutcome,
};
use serde::de::DeserializeOwned;
use tracing::{error, instrument, warn};

use crate::{
    response::ApiResponse,
    routes::{Route, RouteError},
};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigRequest {
    api_key: Option<String>,
    spreadsheet_id: Option<String>,
}

/// Why a request did not produce its normal answer. Each maps to one status code.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed,
    Upstream(String),
}

impl ApiError {
    fn into_response(self) -> ApiResponse {
        match self {
            ApiError::BadRequest(message) => ApiResponse::error(StatusCode::BAD_REQUEST, &message),
            ApiError::NotFound(message) => ApiResponse::error(StatusCode::NOT_FOUND, &message),
            ApiError::MethodNotAllowed => {
                ApiResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Método não permitido")
            }
            ApiError::Upstream(message) => {
                ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, &message)
            }
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(error: RouteError) -> Self {
        match error {
            RouteError::NotFound => ApiError::NotFound("Rota não encontrada".to_string()),
            RouteError::MethodNotAllowed => ApiError::MethodNotAllowed,
            RouteError::InvalidSegment => ApiError::BadRequest(error.to_string()),
        }
    }
}

fn credentials_error(report: Report<CredentialsError>) -> ApiError {
    match report.current_context() {
        CredentialsError::NotConfigured => {
            ApiError::BadRequest("Configuração não encontrada".to_string())
        }
        CredentialsError::MissingField { .. } => {
            ApiError::BadRequest("API key e Spreadsheet ID são obrigatórios".to_string())
        }
    }
}

/// `doing` names the failed operation for the caller, e.g. "Erro ao buscar itens da licitação".
fn service_error(doing: &'static str) -> impl Fn(Report<RecordServiceError>) -> ApiError {
    move |report| match report.current_context() {
        RecordServiceError::Validation { details } => ApiError::BadRequest(details.clone()),
        RecordServiceError::Upstream { message } => {
            error!("{}: {:?}", doing, report);
            ApiError::Upstream(format!("{}: {}", doing, message))
        }
    }
}

/// Express-style bodies: an empty body reads as `{}`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body)
        .map_err(|error| ApiError::BadRequest(format!("Corpo da requisição inválido: {}", error)))
}

pub struct HttpAdapter {
    records: Arc<dyn RecordService>,
    credentials: Arc<CredentialsStore>,
    base_path: String,
}

impl std::fmt::Debug for HttpAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAdapter")
            .field("records", &"<RecordService>")
            .field("base_path", &self.base_path)
            .finish()
    }
}

impl HttpAdapter {
    pub fn new(
        records: Arc<dyn RecordService>,
        credentials: Arc<CredentialsStore>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            records,
            credentials,
            base_path: base_path.into(),
        }
    }

    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.uri().path()))]
    pub async fn serve(&self, request: Request<Body>) -> Response<Body> {
        let (parts, body) = request.into_parts();

        let response = match Route::parse(&parts.method, parts.uri.path(), &self.base_path) {
            Ok(route) => match hyper::body::to_bytes(body).await {
                Ok(body) => self.handle(route, &body).await,
                Err(error) => {
                    warn!("Failed to read request body: {}", error);
                    Err(ApiError::BadRequest(
                        "Corpo da requisição inválido".to_string(),
                    ))
                }
            },
            Err(error) => Err(ApiError::from(error)),
        };

        let response = response.unwrap_or_else(ApiError::into_response);
        tracing::info!(status = response.status.as_u16(), "Request handled");
        response.into_response()
    }

    async fn handle(&self, route: Route, body: &[u8]) -> Result<ApiResponse, ApiError> {
        match route {
            Route::Preflight => Ok(ApiResponse::no_content()),
            Route::GetConfig => Ok(ApiResponse::ok(&self.credentials.status().await)),
            Route::SetConfig => {
                let request: ConfigRequest = parse_body(body)?;
                self.credentials
                    .configure(request.api_key, request.spreadsheet_id)
                    .await
                    .map_err(credentials_error)?;
                Ok(ApiResponse::message("Configuração salva com sucesso"))
            }
            Route::ListLicitacoes => {
                let credentials = self.credentials.snapshot().await.map_err(credentials_error)?;
                let records = self
                    .records
                    .list_parents(&credentials)
                    .await
                    .map_err(service_error("Erro ao buscar dados das licitações"))?;
                Ok(ApiResponse::ok(&records))
            }
            Route::ListItens { unique_id } => {
                let credentials = self.credentials.snapshot().await.map_err(credentials_error)?;
                let records = self
                    .records
                    .list_children(&credentials, &unique_id)
                    .await
                    .map_err(service_error("Erro ao buscar itens da licitação"))?;
                Ok(ApiResponse::ok(&records))
            }
            Route::UpdateLicitacao { unique_id } => {
                let credentials = self.credentials.snapshot().await.map_err(credentials_error)?;
                let fields: RecordFields = parse_body(body)?;
                let outcome = self
                    .records
                    .update_parent(&credentials, &unique_id, &fields)
                    .await
                    .map_err(service_error("Erro ao atualizar licitação"))?;
                match outcome {
                    UpdateOutcome::Updated { .. } => {
                        Ok(ApiResponse::message("Licitação atualizada com sucesso"))
                    }
                    UpdateOutcome::NotFound => {
                        Err(ApiError::NotFound("Licitação não encontrada".to_string()))
                    }
                }
            }
            Route::UpdateItem {
                unique_id,
                item_numero,
            } => {
                let credentials = self.credentials.snapshot().await.map_err(credentials_error)?;
                let fields: RecordFields = parse_body(body)?;
                let outcome = self
                    .records
                    .update_child(&credentials, &unique_id, &item_numero, &fields)
                    .await
                    .map_err(service_error("Erro ao atualizar item"))?;
                match outcome {
                    UpdateOutcome::Updated { .. } => {
                        Ok(ApiResponse::message("Item atualizado com sucesso"))
                    }
                    UpdateOutcome::NotFound => {
                        Err(ApiError::NotFound("Item não encontrado".to_string()))
                    }
                }
            }
        }
    }
}
