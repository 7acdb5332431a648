//! Mapping of gateway errors to HTTP responses.
//!
//! # Design Decisions
//! - Error bodies use `{"detail": ...}`
//! - Registry failures become 502 Bad Gateway; their details stay in the logs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gateway::GatewayError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

pub fn error_response(status: StatusCode, detail: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            detail: detail.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Domain not found"),
            GatewayError::Upstream(e) => {
                tracing::error!(error = %e, "Registry request failed");
                error_response(StatusCode::BAD_GATEWAY, "Registry request failed")
            }
        }
    }
}
