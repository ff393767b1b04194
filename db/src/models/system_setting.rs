use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, DbErr, Set};

/// Persisted runtime switch for application logging (`"true"` / `"false"`).
pub const LOGS_ENABLED_KEY: &str = "logs_enabled";

/// Key/value settings that survive restarts.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "system_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn get(db: &DbConn, key: &str) -> Result<Option<String>, DbErr> {
        Ok(Entity::find_by_id(key.to_owned())
            .one(db)
            .await?
            .map(|setting| setting.value))
    }

    pub async fn set(db: &DbConn, key: &str, value: &str) -> Result<Model, DbErr> {
        let now = Utc::now();

        match Entity::find_by_id(key.to_owned()).one(db).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.value = Set(value.to_owned());
                active.updated_at = Set(now);
                active.update(db).await
            }
            None => {
                ActiveModel {
                    key: Set(key.to_owned()),
                    value: Set(value.to_owned()),
                    updated_at: Set(now),
                }
                .insert(db)
                .await
            }
        }
    }

    /// Reads a boolean setting; anything other than `"true"` / `"false"` counts as unset.
    pub async fn get_bool(db: &DbConn, key: &str) -> Result<Option<bool>, DbErr> {
        Ok(Self::get(db, key)
            .await?
            .and_then(|value| value.trim().parse::<bool>().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn set_inserts_then_overwrites() {
        let db = setup_test_db().await;
        assert_eq!(Model::get_bool(&db, LOGS_ENABLED_KEY).await.unwrap(), None);

        Model::set(&db, LOGS_ENABLED_KEY, "false").await.unwrap();
        assert_eq!(Model::get_bool(&db, LOGS_ENABLED_KEY).await.unwrap(), Some(false));

        Model::set(&db, LOGS_ENABLED_KEY, "true").await.unwrap();
        assert_eq!(Model::get_bool(&db, LOGS_ENABLED_KEY).await.unwrap(), Some(true));
    }
}
