use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::ombudsman::Caller;

use super::common::{TicketEnvelope, TicketQuery, error_response};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/ouvidoria/start?id={ticket_id}
///
/// Called when a staff member first opens a ticket. A ticket still in
/// `Enviado` moves to `Em atendimento` and is assigned to the caller; any
/// other ticket is returned unchanged, so repeating the call is harmless.
///
/// ### Responses
/// - `200 OK` `{ success, chamado }`
/// - `400 Bad Request` (missing or malformed id)
/// - `401 Unauthorized` / `403 Forbidden`
/// - `404 Not Found`
pub async fn start_handling(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<TicketQuery>,
) -> Response {
    let id = match query.require_id() {
        Ok(id) => id.to_owned(),
        Err(e) => return e.into_response(),
    };

    match state.ombudsman().start_handling(&caller, &id).await {
        Ok(view) => (
            StatusCode::OK,
            Json(ApiResponse::success(TicketEnvelope::from(view), "Ticket handling started")),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
