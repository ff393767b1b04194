use db::repositories::StoreError;
use sea_orm::DbErr;
use thiserror::Error;

/// Failures surfaced by the ombudsman operations.
///
/// Email delivery problems are not represented; they never leave the dispatcher.
#[derive(Debug, Error)]
pub enum OmbudsmanError {
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Ticket not found")]
    NotFound,

    #[error("Ticket status changed while the update was being applied; reload and try again")]
    Conflict,

    #[error("Database error: {0}")]
    Store(#[source] DbErr),
}

impl From<StoreError> for OmbudsmanError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => OmbudsmanError::NotFound,
            StoreError::Database(e) => OmbudsmanError::Store(e),
        }
    }
}

impl From<DbErr> for OmbudsmanError {
    fn from(err: DbErr) -> Self {
        OmbudsmanError::Store(err)
    }
}
