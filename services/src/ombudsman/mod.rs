//! Ombudsman (ouvidoria) ticket workflow.
//!
//! Components, leaves first:
//! - [`resolver`]: batch lookup of responsible-party display names
//! - [`transitions`]: the `Enviado -> Em atendimento -> Finalizado` lifecycle
//! - [`dispatcher`]: reply notification emails, delivered off the request path
//! - [`facade`]: the operations the HTTP layer calls
//!
//! Storage is reached through `db::repositories::TicketStore`.

pub mod dispatcher;
pub mod error;
pub mod facade;
pub mod resolver;
pub mod text;
pub mod transitions;

pub use dispatcher::{DispatchOutcome, NotificationSettings, ReplyDispatcher, SkipReason};
pub use error::OmbudsmanError;
pub use facade::{Caller, OmbudsmanService, TicketUpdate, TicketView};

use uuid::Uuid;

/// Strict id check: canonical hyphenated UUIDs only.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == 36 && Uuid::parse_str(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::is_valid_id;

    #[test]
    fn only_hyphenated_uuids_are_valid() {
        assert!(is_valid_id("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_valid_id("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_valid_id("{67e55044-10b1-426f-9247-bb680e5fe0c8}"));
        assert!(!is_valid_id("42"));
        assert!(!is_valid_id(""));
    }
}
