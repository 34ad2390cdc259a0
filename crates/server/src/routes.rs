use std::borrow::Cow;

use hyper::Method;
use percent_encoding::percent_decode_str;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Path segment is not valid UTF-8")]
    InvalidSegment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    GetConfig,
    SetConfig,
    ListLicitacoes,
    ListItens { unique_id: String },
    UpdateLicitacao { unique_id: String },
    UpdateItem { unique_id: String, item_numero: String },
    Preflight,
}

fn decode(segment: &str) -> Result<String, RouteError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| RouteError::InvalidSegment)
}

/// The part of `path` below `base_path`, if it is mounted there at all.
fn strip_base<'a>(path: &'a str, base_path: &str) -> Option<&'a str> {
    let base_path = base_path.trim_end_matches('/');
    if base_path.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(base_path)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

impl Route {
    pub fn parse(method: &Method, path: &str, base_path: &str) -> Result<Route, RouteError> {
        let local = strip_base(path, base_path).ok_or(RouteError::NotFound)?;
        let local = local.strip_prefix('/').unwrap_or(local);
        let local = local.strip_suffix('/').unwrap_or(local);
        let segments: Vec<&str> = local.split('/').collect();

        let known = matches!(
            segments.as_slice(),
            ["config"] | ["licitacoes"] | ["licitacoes", _] | ["itens", _] | ["itens", _, _]
        );
        if !known {
            return Err(RouteError::NotFound);
        }
        if *method == Method::OPTIONS {
            return Ok(Route::Preflight);
        }

        match segments.as_slice() {
            ["config"] if *method == Method::GET => Ok(Route::GetConfig),
            ["config"] if *method == Method::POST => Ok(Route::SetConfig),
            ["licitacoes"] if *method == Method::GET => Ok(Route::ListLicitacoes),
            ["licitacoes", unique_id] if *method == Method::PUT => Ok(Route::UpdateLicitacao {
                unique_id: decode(unique_id)?,
            }),
            ["itens", unique_id] if *method == Method::GET => Ok(Route::ListItens {
                unique_id: decode(unique_id)?,
            }),
            ["itens", unique_id, item_numero] if *method == Method::PUT => Ok(Route::UpdateItem {
                unique_id: decode(unique_id)?,
                item_numero: decode(item_numero)?,
            }),
            _ => Err(RouteError::MethodNotAllowed),
        }
    }
}
