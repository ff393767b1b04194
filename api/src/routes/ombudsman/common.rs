use axum::{Json, http::StatusCode};
use chrono::{DateTime, Utc};
use db::models::ombudsman_ticket::{IdentificationType, TicketStatus};
use serde::{Deserialize, Serialize};
use services::ombudsman::{OmbudsmanError, TicketView};
use validator::Validate;

use crate::response::{ApiResponse, Empty};

pub type ErrorResponse = (StatusCode, Json<ApiResponse<Empty>>);

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub id: Option<String>,
}

impl TicketQuery {
    pub fn require_id(&self) -> Result<&str, ErrorResponse> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| bad_request("Missing ticket id"))
    }
}

/// A ticket as the back office sees it.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: String,
    #[serde(rename = "identificacaoTipo")]
    pub identification_type: IdentificationType,
    #[serde(rename = "nomeCompleto")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "vinculo")]
    pub affiliation: Option<String>,
    #[serde(rename = "tipoManifestacao")]
    pub manifestation_type: String,
    #[serde(rename = "assunto")]
    pub subject: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    pub status: TicketStatus,
    #[serde(rename = "responsavelId")]
    pub responsible_user_id: Option<String>,
    #[serde(rename = "responsavelNome")]
    pub responsible_name: Option<String>,
    pub reply: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<TicketView> for TicketResponse {
    fn from(view: TicketView) -> Self {
        let ticket = view.ticket;
        Self {
            id: ticket.id,
            identification_type: ticket.identification_type,
            full_name: ticket.full_name,
            email: ticket.email,
            phone: ticket.phone,
            affiliation: ticket.affiliation,
            manifestation_type: ticket.manifestation_type,
            subject: ticket.subject,
            message: ticket.message,
            status: ticket.status,
            responsible_user_id: ticket.responsible_user_id,
            responsible_name: view.responsible_name,
            reply: ticket.reply,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketListResponse {
    pub chamados: Vec<TicketResponse>,
}

#[derive(Debug, Serialize)]
pub struct TicketEnvelope {
    pub chamado: TicketResponse,
}

impl From<TicketView> for TicketEnvelope {
    fn from(view: TicketView) -> Self {
        Self {
            chamado: view.into(),
        }
    }
}

/// PATCH body. Every field is optional; at least one must be present.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTicketRequest {
    pub status: Option<String>,

    #[serde(rename = "idUsuarioRecebimento")]
    #[validate(length(max = 64, message = "idUsuarioRecebimento is too long"))]
    pub responsible_user_id: Option<String>,

    #[validate(length(max = 100000, message = "reply is too long"))]
    pub reply: Option<String>,
}

pub fn parse_status(raw: &str) -> Result<TicketStatus, ErrorResponse> {
    raw.trim().parse::<TicketStatus>().map_err(|_| {
        bad_request(format!(
            "Invalid status '{raw}'. Expected one of: {}, {}, {}",
            TicketStatus::Sent,
            TicketStatus::InProgress,
            TicketStatus::Finished
        ))
    })
}

pub fn bad_request(message: impl Into<String>) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

/// Maps service failures onto HTTP statuses. Storage details stay in the log.
pub fn error_response(err: OmbudsmanError) -> ErrorResponse {
    let status = match &err {
        OmbudsmanError::Forbidden(_) => StatusCode::FORBIDDEN,
        OmbudsmanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        OmbudsmanError::NotFound => StatusCode::NOT_FOUND,
        OmbudsmanError::Conflict => StatusCode::CONFLICT,
        OmbudsmanError::Store(e) => {
            tracing::error!(error = %e, "Ombudsman store failure");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal server error")),
            );
        }
    };

    (status, Json(ApiResponse::error(err.to_string())))
}
