use crate::error::Error;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub(crate) struct APIError(anyhow::Error);

impl APIError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<QueryRejection>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.downcast_ref::<Error>() {
            Some(Error::NoRequestUrl | Error::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            Some(Error::NoDistribution(_)) => StatusCode::NOT_FOUND,
            Some(Error::UnresolvedTarget(_) | Error::DNSError(_) | Error::DNSClientError(_)) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let status = self.status();
        let any_err = self.0;
        if status.is_server_error() {
            tracing::error!("exploration failed: {any_err:#}");
        } else {
            tracing::debug!("rejected exploration: {any_err:#}");
        }
        let body = Json(json!({
            "error": format!("{any_err:#}"),
        }));
        (status, body).into_response()
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
