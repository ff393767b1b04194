use axum::{Json, extract::State, http::StatusCode};
use util::logging::LogSettings;

use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/system/logging
///
/// ```json
/// { "success": true, "enabled": true, "directives": "api=info,services=info,db=info", "message": "OK" }
/// ```
pub async fn get_logging(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<LogSettings>>) {
    (
        StatusCode::OK,
        Json(ApiResponse::success(state.log_control().settings(), "OK")),
    )
}
