use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a staff user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Name shown next to the tickets this user handles.
    pub name: String,
    /// User's unique email address.
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Back-office roles. Only `Admin` and `Secretariat` may work ombudsman tickets.
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
#[strum(ascii_case_insensitive)]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    #[strum(serialize = "admin")]
    Admin,

    #[sea_orm(string_value = "secretaria")]
    #[serde(rename = "secretaria")]
    #[strum(serialize = "secretaria")]
    Secretariat,

    #[sea_orm(string_value = "professor")]
    #[serde(rename = "professor")]
    #[strum(serialize = "professor")]
    Professor,

    #[sea_orm(string_value = "analista")]
    #[serde(rename = "analista")]
    #[strum(serialize = "analista")]
    Analyst,
}

impl UserRole {
    pub fn can_handle_ombudsman(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Secretariat)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active_model.insert(db).await
    }
}
