pub mod handlers;

use axum::{routing::post, Router};

use crate::http::server::AppState;
use self::handlers::recalc;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/recalc", post(recalc))
}
