use crate::seed::Seeder;
use db::models::user::{Model, UserRole};
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, name::en::Name},
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use sea_orm::{DatabaseConnection, DbErr};

pub struct UserSeeder;

#[async_trait::async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        // Fixed accounts
        Model::create(db, "Administrador", "admin@example.com", UserRole::Admin).await?;
        Model::create(db, "Secretaria Acadêmica", "secretaria@example.com", UserRole::Secretariat)
            .await?;
        Model::create(db, "Professor Convidado", "professor@example.com", UserRole::Professor)
            .await?;

        let roles = [
            UserRole::Secretariat,
            UserRole::Professor,
            UserRole::Analyst,
        ];
        let mut rng = StdRng::from_entropy();

        for _ in 0..10 {
            let name: String = Name().fake();
            let email: String = SafeEmail().fake();
            let role = roles.choose(&mut rng).copied().unwrap_or(UserRole::Professor);
            // Random emails can collide with earlier ones; skip those.
            let _ = Model::create(db, &name, &email, role).await;
        }

        Ok(())
    }
}
