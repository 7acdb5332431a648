//! Public endpoints: service info, gate and allowed-domain listing.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gateway::policy::COMPLIANCE_HOLD_REASON;
use crate::gateway::{AllowedDomain, GateOutcome, GatewayError};
use crate::http::error::error_response;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub status: &'static str,
    pub message: &'static str,
}

/// `{status, reason}` body shared by the 423 hold and admin responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub reason: Option<String>,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "zerolight-portal-gateway",
        status: "ok",
        message: "Zero-Trust Digital Infrastructure Compliance Gateway",
    })
}

/// Gate outbound access to `domain`: 302 on allow, 423 on hold.
pub async fn go(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Response, GatewayError> {
    match state.service.gate(&domain).await? {
        GateOutcome::Allowed { redirect_to, .. } => match HeaderValue::from_str(&redirect_to) {
            Ok(location) => Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response()),
            Err(_) => {
                tracing::error!(domain = %domain, "Redirect target is not a valid header value");
                Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target"))
            }
        },
        GateOutcome::Blocked { .. } => Ok((
            StatusCode::LOCKED,
            Json(StatusResponse {
                status: "offline".to_string(),
                reason: Some(COMPLIANCE_HOLD_REASON.to_string()),
            }),
        )
            .into_response()),
    }
}

/// Domains currently online, for bots and clients.
pub async fn allowed(State(state): State<AppState>) -> Result<Json<Vec<AllowedDomain>>, GatewayError> {
    Ok(Json(state.service.allowed_domains().await?))
}
