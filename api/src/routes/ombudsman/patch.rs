use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::format_validation_errors;
use services::ombudsman::{Caller, TicketUpdate};
use validator::Validate;

use super::common::{
    ErrorResponse, TicketEnvelope, TicketQuery, UpdateTicketRequest, bad_request, error_response,
    parse_status,
};
use crate::response::ApiResponse;
use crate::state::AppState;

/// PATCH /api/ouvidoria?id={ticket_id}
///
/// Partially updates a ticket. Absent fields are left untouched.
///
/// ### Request Body
/// ```json
/// { "status": "Finalizado", "idUsuarioRecebimento": "…uuid…", "reply": "<p>…</p>" }
/// ```
///
/// - `status` may only move forward (`Enviado` → `Em atendimento` → `Finalizado`).
/// - The first move out of `Enviado` assigns the ticket to the caller unless
///   `idUsuarioRecebimento` is given or a responsible is already recorded.
/// - A blank `reply` clears the stored reply. A non-blank reply on an
///   identified ticket with an email notifies the submitter in the background.
///
/// ### Responses
/// - `200 OK` `{ success, chamado }`
/// - `400 Bad Request` (missing id, malformed or empty body, unknown status,
///   unknown responsible, backward transition)
/// - `401 Unauthorized` / `403 Forbidden`
/// - `404 Not Found`
/// - `409 Conflict` (status changed concurrently)
pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<TicketQuery>,
    payload: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> Response {
    let id = match query.require_id() {
        Ok(id) => id.to_owned(),
        Err(e) => return e.into_response(),
    };

    let update = match payload
        .map_err(|rejection| bad_request(format!("Invalid request body: {}", rejection.body_text())))
        .and_then(|Json(body)| into_update(body))
    {
        Ok(update) => update,
        Err(e) => return e.into_response(),
    };

    match state.ombudsman().update(&caller, &id, update).await {
        Ok(view) => (
            StatusCode::OK,
            Json(ApiResponse::success(TicketEnvelope::from(view), "Ticket updated")),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

fn into_update(body: UpdateTicketRequest) -> Result<TicketUpdate, ErrorResponse> {
    body.validate()
        .map_err(|e| bad_request(format_validation_errors(&e)))?;

    let status = body.status.as_deref().map(parse_status).transpose()?;
    let responsible_user_id = body
        .responsible_user_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty());

    Ok(TicketUpdate {
        status,
        responsible_user_id,
        reply: body.reply,
    })
}
