use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::ombudsman::Caller;

use super::common::{TicketEnvelope, TicketListResponse, TicketQuery, error_response};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/ouvidoria[?id={ticket_id}]
///
/// Without `id`, every ticket newest first as `{ success, chamados }`.
/// With `id`, one ticket as `{ success, chamado }`.
///
/// Each ticket carries `responsavelNome`, which is `null` when the name could
/// not be resolved.
///
/// ### Responses
/// - `200 OK`
/// - `400 Bad Request` (malformed id)
/// - `401 Unauthorized` / `403 Forbidden`
/// - `404 Not Found`
pub async fn get_tickets(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<TicketQuery>,
) -> Response {
    let service = state.ombudsman();

    match query.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => match service.get_by_id(&caller, id).await {
            Ok(view) => (
                StatusCode::OK,
                Json(ApiResponse::success(TicketEnvelope::from(view), "Ticket retrieved")),
            )
                .into_response(),
            Err(e) => error_response(e).into_response(),
        },
        None => match service.list(&caller).await {
            Ok(views) => {
                let payload = TicketListResponse {
                    chamados: views.into_iter().map(Into::into).collect(),
                };
                (
                    StatusCode::OK,
                    Json(ApiResponse::success(payload, "Tickets retrieved")),
                )
                    .into_response()
            }
            Err(e) => error_response(e).into_response(),
        },
    }
}
