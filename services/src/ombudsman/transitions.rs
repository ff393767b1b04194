//! Ticket lifecycle: `Enviado -> Em atendimento -> Finalizado`.
//!
//! Status only moves forward. Skipping `Em atendimento` is allowed, going back
//! is not. The first move out of `Enviado` assigns the ticket to whoever made
//! it unless a responsible is already recorded or supplied.

use std::sync::Arc;

use db::models::ombudsman_ticket::{Model as Ticket, TicketStatus};
use db::repositories::{TicketFilter, TicketPatch, TicketStore};

use super::error::OmbudsmanError;
use super::facade::TicketUpdate;
use super::text::is_blank_reply;

#[derive(Clone)]
pub struct TransitionEngine {
    store: Arc<dyn TicketStore>,
}

impl TransitionEngine {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    pub async fn current(&self, ticket_id: &str) -> Result<Ticket, OmbudsmanError> {
        self.store
            .get_all(&TicketFilter::by_id(ticket_id))
            .await?
            .into_iter()
            .next()
            .ok_or(OmbudsmanError::NotFound)
    }

    /// Moves a `Sent` ticket to `InProgress` and assigns it to `staff_user_id`.
    ///
    /// Tickets past `Sent` come back unchanged, so repeated or concurrent calls
    /// all observe the first caller's assignment.
    pub async fn start_handling(
        &self,
        ticket_id: &str,
        staff_user_id: &str,
    ) -> Result<Ticket, OmbudsmanError> {
        let patch = TicketPatch {
            status: Some(TicketStatus::InProgress),
            responsible_user_id: Some(staff_user_id.to_owned()),
            reply: None,
        };

        match self
            .store
            .update_if_status(ticket_id, TicketStatus::Sent, patch)
            .await?
        {
            Some(ticket) => {
                tracing::info!(
                    ticket_id = %ticket.id,
                    responsible_user_id = %staff_user_id,
                    "Ticket handling started"
                );
                Ok(ticket)
            }
            None => self.current(ticket_id).await,
        }
    }

    /// Rejects moves that would take a ticket back in its lifecycle.
    pub fn check_transition(from: TicketStatus, to: TicketStatus) -> Result<(), OmbudsmanError> {
        if to.rank() < from.rank() {
            return Err(OmbudsmanError::InvalidRequest(format!(
                "Cannot move ticket from {from} to {to}"
            )));
        }
        Ok(())
    }

    /// Builds the store patch for an explicit update of `current` by `caller_id`.
    ///
    /// A status equal to the current one is dropped from the patch. A reply with
    /// neither text nor media clears the stored one.
    pub fn plan_update(
        current: &Ticket,
        update: &TicketUpdate,
        caller_id: &str,
    ) -> Result<TicketPatch, OmbudsmanError> {
        let mut patch = TicketPatch::default();

        if let Some(status) = update.status {
            Self::check_transition(current.status, status)?;
            if status != current.status {
                patch.status = Some(status);
            }
        }

        patch.responsible_user_id = update.responsible_user_id.clone();
        let leaving_sent = current.status == TicketStatus::Sent
            && patch.status.is_some_and(|s| s != TicketStatus::Sent);
        if leaving_sent && patch.responsible_user_id.is_none() && current.responsible_user_id.is_none() {
            patch.responsible_user_id = Some(caller_id.to_owned());
        }

        if let Some(reply) = &update.reply {
            patch.reply = Some((!is_blank_reply(reply)).then(|| reply.clone()));
        }

        Ok(patch)
    }

    /// Writes `patch` over `current`.
    ///
    /// Status changes only land while the row still has the status that was
    /// read; losing that race is a `Conflict`.
    pub async fn apply(&self, current: &Ticket, patch: TicketPatch) -> Result<Ticket, OmbudsmanError> {
        if patch.is_empty() {
            return Ok(current.clone());
        }

        let changes_status = patch.status.is_some();
        let updated = if changes_status {
            self.store
                .update_if_status(&current.id, current.status, patch)
                .await?
                .ok_or(OmbudsmanError::Conflict)?
        } else {
            self.store.update(&current.id, patch).await?
        };

        if changes_status {
            tracing::info!(
                ticket_id = %updated.id,
                from = %current.status,
                to = %updated.status,
                "Ticket status changed"
            );
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::ombudsman_ticket::Model as TicketModel;
    use db::repositories::SeaOrmTicketStore;
    use db::test_utils::{identified_ticket, setup_test_db};

    async fn engine_with_ticket() -> (TransitionEngine, TicketModel) {
        let db = setup_test_db().await;
        let ticket = TicketModel::create(&db, identified_ticket("Matrícula", "a@b.com"))
            .await
            .unwrap();
        (TransitionEngine::new(Arc::new(SeaOrmTicketStore::new(db))), ticket)
    }

    fn status_only(status: TicketStatus) -> TicketUpdate {
        TicketUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn start_handling_is_idempotent() {
        let (engine, ticket) = engine_with_ticket().await;

        let first = engine.start_handling(&ticket.id, "staff-a").await.unwrap();
        let again = engine.start_handling(&ticket.id, "staff-a").await.unwrap();
        let other = engine.start_handling(&ticket.id, "staff-b").await.unwrap();

        for state in [&first, &again, &other] {
            assert_eq!(state.status, TicketStatus::InProgress);
            assert_eq!(state.responsible_user_id.as_deref(), Some("staff-a"));
        }
        assert_eq!(other.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn start_handling_unknown_ticket_is_not_found() {
        let (engine, _) = engine_with_ticket().await;

        let err = engine
            .start_handling("67e55044-10b1-426f-9247-bb680e5fe0c8", "staff-a")
            .await
            .unwrap_err();
        assert!(matches!(err, OmbudsmanError::NotFound));
    }

    #[tokio::test]
    async fn concurrent_start_handling_has_one_winner() {
        let (engine, ticket) = engine_with_ticket().await;

        let (a, b) = tokio::join!(
            engine.start_handling(&ticket.id, "staff-a"),
            engine.start_handling(&ticket.id, "staff-b"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.responsible_user_id, b.responsible_user_id);
        let stored = engine.current(&ticket.id).await.unwrap();
        assert_eq!(stored.responsible_user_id, a.responsible_user_id);
    }

    #[test]
    fn backward_moves_are_rejected() {
        use TicketStatus::*;

        assert!(TransitionEngine::check_transition(Sent, InProgress).is_ok());
        assert!(TransitionEngine::check_transition(Sent, Finished).is_ok());
        assert!(TransitionEngine::check_transition(InProgress, InProgress).is_ok());

        let err = TransitionEngine::check_transition(Finished, Sent).unwrap_err();
        assert_eq!(err.to_string(), "Cannot move ticket from Finalizado to Enviado");
        assert!(TransitionEngine::check_transition(InProgress, Sent).is_err());
    }

    #[tokio::test]
    async fn first_move_out_of_sent_assigns_caller() {
        let (_, ticket) = engine_with_ticket().await;

        let patch =
            TransitionEngine::plan_update(&ticket, &status_only(TicketStatus::Finished), "caller")
                .unwrap();
        assert_eq!(patch.status, Some(TicketStatus::Finished));
        assert_eq!(patch.responsible_user_id.as_deref(), Some("caller"));
    }

    #[tokio::test]
    async fn explicit_responsible_wins_over_auto_assignment() {
        let (_, ticket) = engine_with_ticket().await;
        let update = TicketUpdate {
            status: Some(TicketStatus::InProgress),
            responsible_user_id: Some("chosen".into()),
            reply: None,
        };

        let patch = TransitionEngine::plan_update(&ticket, &update, "caller").unwrap();
        assert_eq!(patch.responsible_user_id.as_deref(), Some("chosen"));
    }

    #[tokio::test]
    async fn no_auto_assignment_once_handled() {
        let (engine, ticket) = engine_with_ticket().await;
        let handled = engine.start_handling(&ticket.id, "staff-a").await.unwrap();

        let patch =
            TransitionEngine::plan_update(&handled, &status_only(TicketStatus::Finished), "caller")
                .unwrap();
        assert_eq!(patch.responsible_user_id, None);
    }

    #[tokio::test]
    async fn same_status_and_blank_reply() {
        let (_, ticket) = engine_with_ticket().await;
        let update = TicketUpdate {
            status: Some(TicketStatus::Sent),
            responsible_user_id: None,
            reply: Some("<p> </p>".into()),
        };

        let patch = TransitionEngine::plan_update(&ticket, &update, "caller").unwrap();
        assert_eq!(patch.status, None);
        assert_eq!(patch.responsible_user_id, None);
        assert_eq!(patch.reply, Some(None));
    }

    #[tokio::test]
    async fn stale_status_is_a_conflict() {
        let (engine, ticket) = engine_with_ticket().await;
        engine.start_handling(&ticket.id, "staff-a").await.unwrap();

        // `ticket` still says Sent.
        let patch = TicketPatch {
            status: Some(TicketStatus::Finished),
            ..Default::default()
        };
        let err = engine.apply(&ticket, patch).await.unwrap_err();
        assert!(matches!(err, OmbudsmanError::Conflict));
    }

    #[tokio::test]
    async fn empty_patch_returns_current() {
        let (engine, ticket) = engine_with_ticket().await;

        let same = engine.apply(&ticket, TicketPatch::default()).await.unwrap();
        assert_eq!(same, ticket);
    }
}
