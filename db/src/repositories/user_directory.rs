use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::models::user::{Column, Entity, Model, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName {
    pub id: String,
    pub display_name: String,
}

/// What the auth layer needs to know about the owner of a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<Model> for UserProfile {
    fn from(user: Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Read-only lookups against the staff directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Display names for the given ids in one query. Unknown ids are simply absent.
    async fn display_names(&self, ids: &[String]) -> Result<Vec<DisplayName>, DbErr>;

    async fn profile(&self, id: &str) -> Result<Option<UserProfile>, DbErr>;
}

#[derive(Clone)]
pub struct SeaOrmUserDirectory {
    db: DatabaseConnection,
}

impl SeaOrmUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SeaOrmUserDirectory {
    async fn display_names(&self, ids: &[String]) -> Result<Vec<DisplayName>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Entity::find()
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await?;

        Ok(users
            .into_iter()
            .map(|user| DisplayName {
                id: user.id,
                display_name: user.name,
            })
            .collect())
    }

    async fn profile(&self, id: &str) -> Result<Option<UserProfile>, DbErr> {
        Ok(Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .map(UserProfile::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn display_names_skips_unknown_ids() {
        let db = setup_test_db().await;
        let ana = Model::create(&db, "Ana Souza", "ana@example.com", UserRole::Secretariat)
            .await
            .unwrap();
        let directory = SeaOrmUserDirectory::new(db);

        let names = directory
            .display_names(&[ana.id.clone(), "6f1c1c1e-0000-4000-8000-000000000000".into()])
            .await
            .unwrap();

        assert_eq!(
            names,
            vec![DisplayName {
                id: ana.id,
                display_name: "Ana Souza".into()
            }]
        );
    }

    #[tokio::test]
    async fn profile_carries_role() {
        let db = setup_test_db().await;
        let admin = Model::create(&db, "Root", "root@example.com", UserRole::Admin)
            .await
            .unwrap();
        let directory = SeaOrmUserDirectory::new(db);

        let profile = directory.profile(&admin.id).await.unwrap().unwrap();
        assert_eq!(profile.role, UserRole::Admin);
        assert!(directory.profile("nobody").await.unwrap().is_none());
    }
}
