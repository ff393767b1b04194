use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::ombudsman_ticket::{IdentificationType, NewTicket};

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// An identified submission with the given subject and contact email.
pub fn identified_ticket(subject: &str, email: &str) -> NewTicket {
    NewTicket {
        identification_type: IdentificationType::Identified,
        full_name: Some("Maria Oliveira".into()),
        email: Some(email.into()),
        phone: Some("(21) 99999-0000".into()),
        affiliation: Some("Aluno".into()),
        manifestation_type: "Reclamação".into(),
        subject: subject.into(),
        message: "Descrição da manifestação.".into(),
        created_at: None,
    }
}

pub fn anonymous_ticket(subject: &str) -> NewTicket {
    NewTicket {
        identification_type: IdentificationType::Anonymous,
        full_name: None,
        email: None,
        phone: None,
        affiliation: None,
        manifestation_type: "Denúncia".into(),
        subject: subject.into(),
        message: "Relato anônimo.".into(),
        created_at: None,
    }
}
