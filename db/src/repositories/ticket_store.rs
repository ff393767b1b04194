//! Persistence for ombudsman tickets.
//!
//! The store only reads and writes rows. Lifecycle rules live in the
//! `services` crate; the one thing the store adds is `update_if_status`, a
//! single conditional `UPDATE` that lets callers detect a lost race on the
//! ticket status.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use thiserror::Error;

use crate::models::ombudsman_ticket::{ActiveModel, Column, Entity, Model, TicketStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Ticket not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Narrows `get_all`. An empty filter returns every ticket.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub id: Option<String>,
}

impl TicketFilter {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// Partial update. `None` leaves a column untouched.
///
/// `reply` is doubly optional so a patch can clear the stored reply
/// (`Some(None)`) as well as leave it alone (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketPatch {
    pub status: Option<TicketStatus>,
    pub responsible_user_id: Option<String>,
    pub reply: Option<Option<String>>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.responsible_user_id.is_none() && self.reply.is_none()
    }

    fn apply(self, active: &mut ActiveModel) {
        if let Some(status) = self.status {
            active.status = Set(status);
        }
        if let Some(responsible) = self.responsible_user_id {
            active.responsible_user_id = Set(Some(responsible));
        }
        if let Some(reply) = self.reply {
            active.reply = Set(reply);
        }
        active.updated_at = Set(Utc::now());
    }
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// All tickets matching `filter`, newest first.
    async fn get_all(&self, filter: &TicketFilter) -> Result<Vec<Model>, StoreError>;

    /// Applies `patch` to one ticket and returns the stored row.
    async fn update(&self, id: &str, patch: TicketPatch) -> Result<Model, StoreError>;

    /// Applies `patch` only while the ticket is still in `expected` status.
    ///
    /// Returns `Ok(None)` when the ticket exists but its status has moved on.
    async fn update_if_status(
        &self,
        id: &str,
        expected: TicketStatus,
        patch: TicketPatch,
    ) -> Result<Option<Model>, StoreError>;
}

/// `TicketStore` backed by the application database.
#[derive(Clone)]
pub struct SeaOrmTicketStore {
    db: DatabaseConnection,
}

impl SeaOrmTicketStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id.to_owned()).one(&self.db).await
    }
}

#[async_trait]
impl TicketStore for SeaOrmTicketStore {
    async fn get_all(&self, filter: &TicketFilter) -> Result<Vec<Model>, StoreError> {
        let mut query = Entity::find();
        if let Some(id) = &filter.id {
            query = query.filter(Column::Id.eq(id.as_str()));
        }

        let tickets = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(tickets)
    }

    async fn update(&self, id: &str, patch: TicketPatch) -> Result<Model, StoreError> {
        let ticket = self.find(id).await?.ok_or(StoreError::NotFound)?;

        let mut active: ActiveModel = ticket.into();
        patch.apply(&mut active);

        Ok(active.update(&self.db).await?)
    }

    async fn update_if_status(
        &self,
        id: &str,
        expected: TicketStatus,
        patch: TicketPatch,
    ) -> Result<Option<Model>, StoreError> {
        let mut active = <ActiveModel as Default>::default();
        patch.apply(&mut active);

        let result = Entity::update_many()
            .set(active)
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected.into_value()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return match self.find(id).await? {
                Some(_) => Ok(None),
                None => Err(StoreError::NotFound),
            };
        }

        // The row matched a moment ago; a vanished row here means it was deleted out from under us.
        self.find(id)
            .await?
            .map(Some)
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ombudsman_ticket::Model as TicketModel;
    use crate::test_utils::{identified_ticket, setup_test_db};
    use chrono::{Duration, TimeZone};

    async fn store_with_tickets() -> (SeaOrmTicketStore, Vec<TicketModel>) {
        let db = setup_test_db().await;
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let mut created = Vec::new();
        for (offset, subject) in ["Primeiro", "Segundo", "Terceiro"].iter().enumerate() {
            let mut new = identified_ticket(subject, "a@b.com");
            new.created_at = Some(base + Duration::days(offset as i64));
            created.push(TicketModel::create(&db, new).await.unwrap());
        }

        (SeaOrmTicketStore::new(db), created)
    }

    #[tokio::test]
    async fn get_all_returns_newest_first() {
        let (store, _) = store_with_tickets().await;

        let tickets = store.get_all(&TicketFilter::default()).await.unwrap();
        let subjects: Vec<_> = tickets.iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Terceiro", "Segundo", "Primeiro"]);
    }

    #[tokio::test]
    async fn get_all_narrows_to_one_id() {
        let (store, created) = store_with_tickets().await;

        let tickets = store
            .get_all(&TicketFilter::by_id(created[1].id.clone()))
            .await
            .unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].subject, "Segundo");

        let none = store
            .get_all(&TicketFilter::by_id("00000000-0000-0000-0000-000000000000"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_changes_only_patched_columns() {
        let (store, created) = store_with_tickets().await;
        let original = &created[0];

        let updated = store
            .update(
                &original.id,
                TicketPatch {
                    reply: Some(Some("<p>Ok</p>".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.reply.as_deref(), Some("<p>Ok</p>"));
        assert_eq!(updated.status, TicketStatus::Sent);
        assert_eq!(updated.responsible_user_id, None);
        assert_eq!(updated.subject, original.subject);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let (store, _) = store_with_tickets().await;

        let err = store
            .update("missing", TicketPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn update_if_status_applies_once() {
        let (store, created) = store_with_tickets().await;
        let id = &created[0].id;
        let patch = |user: &str| TicketPatch {
            status: Some(TicketStatus::InProgress),
            responsible_user_id: Some(user.into()),
            reply: None,
        };

        let first = store
            .update_if_status(id, TicketStatus::Sent, patch("staff-a"))
            .await
            .unwrap()
            .expect("first transition applies");
        assert_eq!(first.status, TicketStatus::InProgress);
        assert_eq!(first.responsible_user_id.as_deref(), Some("staff-a"));

        let second = store
            .update_if_status(id, TicketStatus::Sent, patch("staff-b"))
            .await
            .unwrap();
        assert!(second.is_none());

        let current = store.get_all(&TicketFilter::by_id(id.clone())).await.unwrap();
        assert_eq!(current[0].responsible_user_id.as_deref(), Some("staff-a"));
    }

    #[tokio::test]
    async fn update_if_status_unknown_id_is_not_found() {
        let (store, _) = store_with_tickets().await;

        let err = store
            .update_if_status("missing", TicketStatus::Sent, TicketPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
