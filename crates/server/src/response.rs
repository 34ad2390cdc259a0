use hyper::{
    header::{self, HeaderValue},
    Body, Response, StatusCode,
};
use serde::Serialize;
use serde_json::{json, Value};

/// A JSON reply before it becomes a hyper response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => ApiResponse {
                status: StatusCode::OK,
                body: Some(body),
            },
            Err(error) => {
                tracing::error!("Failed to serialize response: {}", error);
                ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno")
            }
        }
    }

    pub fn message(message: &str) -> Self {
        ApiResponse {
            status: StatusCode::OK,
            body: Some(json!({ "message": message })),
        }
    }

    pub fn error(status: StatusCode, error: &str) -> Self {
        ApiResponse {
            status,
            body: Some(json!({ "error": error })),
        }
    }

    pub fn no_content() -> Self {
        ApiResponse {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    pub fn into_response(self) -> Response<Body> {
        let mut response = match self.body {
            Some(body) => {
                let mut response = Response::new(Body::from(body.to_string()));
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                );
                response
            }
            None => Response::new(Body::empty()),
        };
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = ApiResponse::error(StatusCode::NOT_FOUND, "Item não encontrado");
        assert_eq!(response.body, Some(json!({ "error": "Item não encontrado" })));
    }

    #[test]
    fn test_into_response_sets_cors_and_content_type() {
        let response = ApiResponse::message("ok").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_no_content_has_no_type() {
        let response = ApiResponse::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
