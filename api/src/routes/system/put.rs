use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use db::models::system_setting::{LOGS_ENABLED_KEY, Model as SystemSetting};
use serde::Deserialize;
use services::ombudsman::Caller;
use util::logging::LogSettings;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetLoggingRequest {
    pub enabled: bool,
}

/// PUT /api/system/logging
///
/// Turns application logging on or off. The choice is persisted and applied
/// again on the next start.
///
/// ### Request Body
/// ```json
/// { "enabled": false }
/// ```
///
/// ### Responses
/// - `200 OK` with the new settings
/// - `400 Bad Request` (malformed body)
/// - `401 Unauthorized` / `403 Forbidden`
/// - `500 Internal Server Error`
pub async fn set_logging(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<SetLoggingRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse<LogSettings>>) {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!(
                    "Invalid request body: {}",
                    rejection.body_text()
                ))),
            );
        }
    };

    if let Err(e) = SystemSetting::set(state.db(), LOGS_ENABLED_KEY, &req.enabled.to_string()).await {
        tracing::error!(error = %e, "Failed to persist logging setting");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to save logging setting")),
        );
    }

    // Logged before the switch so that disabling still leaves a trace.
    tracing::info!(enabled = req.enabled, user_id = %caller.user_id, "Logging reconfigured");

    match state.log_control().reconfigure(req.enabled) {
        Ok(settings) => (
            StatusCode::OK,
            Json(ApiResponse::success(settings, "Logging settings updated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to apply logging setting");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to apply logging setting")),
            )
        }
    }
}
