use axum::{extract::State, Json};

use crate::gateway::GatewayError;
use crate::http::server::AppState;
use crate::http::StatusResponse;

/// Re-evaluate every domain against today's anomalies.
///
/// Registry failures abort the pass and surface as 502; domains processed
/// before the failure keep their new status.
pub async fn recalc(State(state): State<AppState>) -> Result<Json<StatusResponse>, GatewayError> {
    state.service.recalculate().await?;

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        reason: Some("Recalculated for all domains".to_string()),
    }))
}
