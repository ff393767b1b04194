//! Ombudsman ticket entity (`ombudsman_tickets`).
//!
//! Column names follow the Portuguese wire vocabulary of the back office
//! (`assunto`, `mensagem`, `id_usuario_recebimento`, ...); field names are English.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ombudsman_tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_name = "identificacao_tipo")]
    pub identification_type: IdentificationType,
    #[sea_orm(column_name = "nome_completo")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[sea_orm(column_name = "telefone")]
    pub phone: Option<String>,
    #[sea_orm(column_name = "vinculo")]
    pub affiliation: Option<String>,

    #[sea_orm(column_name = "tipo_manifestacao")]
    pub manifestation_type: String,
    #[sea_orm(column_name = "assunto", column_type = "Text")]
    pub subject: String,
    #[sea_orm(column_name = "mensagem", column_type = "Text")]
    pub message: String,

    pub status: TicketStatus,
    #[sea_orm(column_name = "id_usuario_recebimento")]
    pub responsible_user_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reply: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket lifecycle. Only forward moves are valid: `Sent -> InProgress -> Finished`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TicketStatus {
    #[sea_orm(string_value = "Enviado")]
    #[serde(rename = "Enviado")]
    #[strum(serialize = "Enviado")]
    Sent,

    #[sea_orm(string_value = "Em atendimento")]
    #[serde(rename = "Em atendimento")]
    #[strum(serialize = "Em atendimento")]
    InProgress,

    #[sea_orm(string_value = "Finalizado")]
    #[serde(rename = "Finalizado")]
    #[strum(serialize = "Finalizado")]
    Finished,
}

impl TicketStatus {
    /// Position in the lifecycle; a valid transition never decreases it.
    pub fn rank(self) -> u8 {
        match self {
            TicketStatus::Sent => 0,
            TicketStatus::InProgress => 1,
            TicketStatus::Finished => 2,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum IdentificationType {
    #[sea_orm(string_value = "identificado")]
    #[serde(rename = "identificado")]
    #[strum(serialize = "identificado")]
    Identified,

    #[sea_orm(string_value = "anonimo")]
    #[serde(rename = "anonimo")]
    #[strum(serialize = "anonimo")]
    Anonymous,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Fields supplied by the public submission form.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub identification_type: IdentificationType,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub affiliation: Option<String>,
    pub manifestation_type: String,
    pub subject: String,
    pub message: String,
    /// Defaults to now.
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Inserts a new ticket in `Sent` status.
    ///
    /// Contact fields are dropped for anonymous submissions.
    pub async fn create(db: &DbConn, new: NewTicket) -> Result<Model, DbErr> {
        let now = Utc::now();
        let identified = new.identification_type == IdentificationType::Identified;
        let contact = |value: Option<String>| if identified { value } else { None };

        let active_model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            identification_type: Set(new.identification_type),
            full_name: Set(contact(new.full_name)),
            email: Set(contact(new.email)),
            phone: Set(contact(new.phone)),
            affiliation: Set(contact(new.affiliation)),
            manifestation_type: Set(new.manifestation_type),
            subject: Set(new.subject),
            message: Set(new.message),
            status: Set(TicketStatus::Sent),
            responsible_user_id: Set(None),
            reply: Set(None),
            created_at: Set(new.created_at.unwrap_or(now)),
            updated_at: Set(now),
        };

        active_model.insert(db).await
    }

    pub fn is_identified(&self) -> bool {
        self.identification_type == IdentificationType::Identified
    }

    /// The address replies should go to, if the submitter can be contacted.
    pub fn contact_email(&self) -> Option<&str> {
        if !self.is_identified() {
            return None;
        }
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{identified_ticket, setup_test_db};

    #[tokio::test]
    async fn anonymous_submission_drops_contact_fields() {
        let db = setup_test_db().await;
        let mut new = identified_ticket("Barulho na biblioteca", "a@b.com");
        new.identification_type = IdentificationType::Anonymous;

        let ticket = Model::create(&db, new).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Sent);
        assert_eq!(ticket.email, None);
        assert_eq!(ticket.full_name, None);
        assert_eq!(ticket.contact_email(), None);
    }

    #[tokio::test]
    async fn identified_submission_keeps_contact_email() {
        let db = setup_test_db().await;
        let ticket = Model::create(&db, identified_ticket("Matrícula", " a@b.com "))
            .await
            .unwrap();

        assert_eq!(ticket.contact_email(), Some("a@b.com"));
        assert_eq!(ticket.responsible_user_id, None);
        assert_eq!(ticket.reply, None);
    }

    #[test]
    fn status_labels_and_rank() {
        assert_eq!(TicketStatus::InProgress.to_string(), "Em atendimento");
        assert!(TicketStatus::Sent.rank() < TicketStatus::InProgress.rank());
        assert!(TicketStatus::InProgress.rank() < TicketStatus::Finished.rank());
    }
}
