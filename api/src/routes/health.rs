use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /api/health
///
/// ```json
/// { "success": true, "status": "ok", "message": "Health check passed" }
/// ```
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success(Health { status: "ok" }, "Health check passed"))
}
