use std::sync::Arc;

use db::models::ombudsman_ticket::{Model as Ticket, TicketStatus};
use db::models::user::UserRole;
use db::repositories::{TicketFilter, TicketStore, UserDirectory};

use super::dispatcher::ReplyDispatcher;
use super::error::OmbudsmanError;
use super::is_valid_id;
use super::resolver::ResponsibleResolver;
use super::text::has_visible_content;
use super::transitions::TransitionEngine;

/// The authenticated staff member behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: UserRole,
}

/// Fields an explicit update may touch. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    pub status: Option<TicketStatus>,
    pub responsible_user_id: Option<String>,
    pub reply: Option<String>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.responsible_user_id.is_none() && self.reply.is_none()
    }
}

/// A ticket plus the display name of its responsible, when known.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketView {
    pub ticket: Ticket,
    pub responsible_name: Option<String>,
}

#[derive(Clone)]
pub struct OmbudsmanService {
    store: Arc<dyn TicketStore>,
    directory: Arc<dyn UserDirectory>,
    engine: TransitionEngine,
    resolver: ResponsibleResolver,
    dispatcher: ReplyDispatcher,
}

impl OmbudsmanService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        directory: Arc<dyn UserDirectory>,
        dispatcher: ReplyDispatcher,
    ) -> Self {
        Self {
            engine: TransitionEngine::new(store.clone()),
            resolver: ResponsibleResolver::new(directory.clone()),
            store,
            directory,
            dispatcher,
        }
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<TicketView>, OmbudsmanError> {
        authorize(caller)?;

        let tickets = self.store.get_all(&TicketFilter::default()).await?;
        let names = self.resolver.resolve(&tickets).await;

        Ok(tickets
            .into_iter()
            .map(|ticket| {
                let responsible_name = ticket
                    .responsible_user_id
                    .as_ref()
                    .and_then(|id| names.get(id).cloned());
                TicketView {
                    ticket,
                    responsible_name,
                }
            })
            .collect())
    }

    pub async fn get_by_id(&self, caller: &Caller, id: &str) -> Result<TicketView, OmbudsmanError> {
        authorize(caller)?;
        validate_ticket_id(id)?;

        let ticket = self.engine.current(id).await?;
        Ok(self.enrich(ticket).await)
    }

    /// Applies a partial update, then hands a non-empty reply to the dispatcher.
    ///
    /// The dispatch outcome never changes the result; the update is already stored.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        update: TicketUpdate,
    ) -> Result<TicketView, OmbudsmanError> {
        authorize(caller)?;
        validate_ticket_id(id)?;

        if update.is_empty() {
            return Err(OmbudsmanError::InvalidRequest(
                "Provide at least one of status, idUsuarioRecebimento or reply".into(),
            ));
        }
        if let Some(responsible) = &update.responsible_user_id {
            self.ensure_user_exists(responsible).await?;
        }

        let current = self.engine.current(id).await?;
        let patch = TransitionEngine::plan_update(&current, &update, &caller.user_id)?;
        let updated = self.engine.apply(&current, patch).await?;

        if let Some(reply) = update.reply.as_deref().filter(|r| has_visible_content(r)) {
            let outcome = self.dispatcher.dispatch(&updated, reply);
            tracing::debug!(ticket_id = %updated.id, ?outcome, "Reply dispatch");
        }

        Ok(self.enrich(updated).await)
    }

    /// Marks the ticket as being handled by the caller on first view.
    pub async fn start_handling(&self, caller: &Caller, id: &str) -> Result<TicketView, OmbudsmanError> {
        authorize(caller)?;
        validate_ticket_id(id)?;

        let ticket = self.engine.start_handling(id, &caller.user_id).await?;
        Ok(self.enrich(ticket).await)
    }

    async fn enrich(&self, ticket: Ticket) -> TicketView {
        let names = self.resolver.resolve(std::slice::from_ref(&ticket)).await;
        let responsible_name = ticket
            .responsible_user_id
            .as_ref()
            .and_then(|id| names.get(id).cloned());
        TicketView {
            ticket,
            responsible_name,
        }
    }

    async fn ensure_user_exists(&self, user_id: &str) -> Result<(), OmbudsmanError> {
        let known = is_valid_id(user_id) && self.directory.profile(user_id).await?.is_some();
        if !known {
            return Err(OmbudsmanError::InvalidRequest(format!(
                "Unknown user '{user_id}' for idUsuarioRecebimento"
            )));
        }
        Ok(())
    }
}

fn authorize(caller: &Caller) -> Result<(), OmbudsmanError> {
    if caller.role.can_handle_ombudsman() {
        Ok(())
    } else {
        Err(OmbudsmanError::Forbidden(
            "Only admin and secretaria staff can access the ombudsman".into(),
        ))
    }
}

fn validate_ticket_id(id: &str) -> Result<(), OmbudsmanError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(OmbudsmanError::InvalidRequest("Invalid ticket id".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MemoryMailer;
    use crate::ombudsman::dispatcher::NotificationSettings;
    use async_trait::async_trait;
    use db::models::ombudsman_ticket::Model as TicketModel;
    use db::models::user::Model as UserModel;
    use db::repositories::{
        DisplayName, SeaOrmTicketStore, SeaOrmUserDirectory, UserProfile,
    };
    use db::test_utils::{anonymous_ticket, identified_ticket, setup_test_db};
    use sea_orm::{DatabaseConnection, DbErr};
    use std::time::Duration;

    struct Fixture {
        db: DatabaseConnection,
        service: OmbudsmanService,
        mailer: MemoryMailer,
        staff: Caller,
        staff_name: String,
    }

    async fn fixture() -> Fixture {
        let db = setup_test_db().await;
        let user = UserModel::create(&db, "Ana Souza", "ana@example.com", UserRole::Secretariat)
            .await
            .unwrap();
        let mailer = MemoryMailer::new();
        let settings = NotificationSettings {
            retry_backoff: Duration::from_millis(5),
            ..Default::default()
        };
        let service = OmbudsmanService::new(
            Arc::new(SeaOrmTicketStore::new(db.clone())),
            Arc::new(SeaOrmUserDirectory::new(db.clone())),
            ReplyDispatcher::start(Arc::new(mailer.clone()), settings),
        );

        Fixture {
            db,
            service,
            mailer,
            staff: Caller {
                user_id: user.id,
                role: user.role,
            },
            staff_name: user.name,
        }
    }

    fn reply(html: &str) -> TicketUpdate {
        TicketUpdate {
            reply: Some(html.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn end_to_end_start_then_reply() {
        let f = fixture().await;
        let ticket = TicketModel::create(&f.db, identified_ticket("Matrícula trancada", "a@b.com"))
            .await
            .unwrap();

        let started = f.service.start_handling(&f.staff, &ticket.id).await.unwrap();
        assert_eq!(started.ticket.status, TicketStatus::InProgress);
        assert_eq!(started.ticket.responsible_user_id.as_deref(), Some(f.staff.user_id.as_str()));
        assert_eq!(started.responsible_name.as_deref(), Some(f.staff_name.as_str()));

        let replied = f
            .service
            .update(&f.staff, &ticket.id, reply("<p>Resolvido</p>"))
            .await
            .unwrap();
        assert_eq!(replied.ticket.reply.as_deref(), Some("<p>Resolvido</p>"));
        assert_eq!(replied.ticket.status, TicketStatus::InProgress);

        let sent = f.mailer.wait_for(1, Duration::from_secs(2)).await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("Matrícula trancada"));
        assert_eq!(f.mailer.attempts(), 1);
    }

    #[tokio::test]
    async fn image_only_reply_is_stored_without_notification() {
        let f = fixture().await;
        let ticket = TicketModel::create(&f.db, identified_ticket("Comprovante", "a@b.com"))
            .await
            .unwrap();
        let html = "<p><img src=\"https://x/comprovante.png\"></p>";

        let updated = f.service.update(&f.staff, &ticket.id, reply(html)).await.unwrap();
        assert_eq!(updated.ticket.reply.as_deref(), Some(html));

        let cleared = f.service.update(&f.staff, &ticket.id, reply("<p> </p>")).await.unwrap();
        assert_eq!(cleared.ticket.reply, None);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.mailer.attempts(), 0);
    }

    #[tokio::test]
    async fn reply_only_update_leaves_status_and_responsible() {
        let f = fixture().await;
        let ticket = TicketModel::create(&f.db, anonymous_ticket("Assédio")).await.unwrap();

        let updated = f.service.update(&f.staff, &ticket.id, reply("x")).await.unwrap();

        assert_eq!(updated.ticket.reply.as_deref(), Some("x"));
        assert_eq!(updated.ticket.status, TicketStatus::Sent);
        assert_eq!(updated.ticket.responsible_user_id, None);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.mailer.attempts(), 0);
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let f = fixture().await;
        let ticket = TicketModel::create(&f.db, anonymous_ticket("A")).await.unwrap();

        let err = f
            .service
            .update(&f.staff, &ticket.id, TicketUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OmbudsmanError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn explicit_status_change_auto_assigns_caller() {
        let f = fixture().await;
        let ticket = TicketModel::create(&f.db, anonymous_ticket("A")).await.unwrap();

        let finished = f
            .service
            .update(
                &f.staff,
                &ticket.id,
                TicketUpdate {
                    status: Some(TicketStatus::Finished),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(finished.ticket.status, TicketStatus::Finished);
        assert_eq!(finished.ticket.responsible_user_id.as_deref(), Some(f.staff.user_id.as_str()));

        let err = f
            .service
            .update(
                &f.staff,
                &ticket.id,
                TicketUpdate {
                    status: Some(TicketStatus::Sent),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OmbudsmanError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn unknown_responsible_is_rejected() {
        let f = fixture().await;
        let ticket = TicketModel::create(&f.db, anonymous_ticket("A")).await.unwrap();

        for responsible in ["staff-1", "67e55044-10b1-426f-9247-bb680e5fe0c8"] {
            let err = f
                .service
                .update(
                    &f.staff,
                    &ticket.id,
                    TicketUpdate {
                        responsible_user_id: Some(responsible.into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, OmbudsmanError::InvalidRequest(_)), "{responsible}");
        }
    }

    #[tokio::test]
    async fn roles_outside_staff_are_forbidden() {
        let f = fixture().await;
        let professor = Caller {
            user_id: f.staff.user_id.clone(),
            role: UserRole::Professor,
        };

        assert!(matches!(
            f.service.list(&professor).await.unwrap_err(),
            OmbudsmanError::Forbidden(_)
        ));
        assert!(matches!(
            f.service
                .start_handling(&professor, "67e55044-10b1-426f-9247-bb680e5fe0c8")
                .await
                .unwrap_err(),
            OmbudsmanError::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn get_by_id_validates_and_reports_missing() {
        let f = fixture().await;

        assert!(matches!(
            f.service.get_by_id(&f.staff, "42").await.unwrap_err(),
            OmbudsmanError::InvalidRequest(_)
        ));
        assert!(matches!(
            f.service
                .get_by_id(&f.staff, "67e55044-10b1-426f-9247-bb680e5fe0c8")
                .await
                .unwrap_err(),
            OmbudsmanError::NotFound
        ));
    }

    struct NamesOffline(SeaOrmUserDirectory);

    #[async_trait]
    impl UserDirectory for NamesOffline {
        async fn display_names(&self, _ids: &[String]) -> Result<Vec<DisplayName>, DbErr> {
            Err(DbErr::Custom("directory offline".into()))
        }

        async fn profile(&self, id: &str) -> Result<Option<UserProfile>, DbErr> {
            self.0.profile(id).await
        }
    }

    #[tokio::test]
    async fn list_survives_directory_failure() {
        let f = fixture().await;
        for subject in ["A", "B"] {
            let ticket = TicketModel::create(&f.db, anonymous_ticket(subject)).await.unwrap();
            f.service.start_handling(&f.staff, &ticket.id).await.unwrap();
        }

        let degraded = OmbudsmanService::new(
            Arc::new(SeaOrmTicketStore::new(f.db.clone())),
            Arc::new(NamesOffline(SeaOrmUserDirectory::new(f.db.clone()))),
            ReplyDispatcher::disabled(NotificationSettings::default()),
        );
        let views = degraded.list(&f.staff).await.unwrap();

        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.responsible_name.is_none()));
        assert!(views.iter().all(|v| v.ticket.responsible_user_id.is_some()));
    }
}
