use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use util::config::AppConfig;

use crate::seed::{Seeder, run_seeder};
use crate::seeds::{ombudsman_ticket::OmbudsmanTicketSeeder, user::UserSeeder};

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let db = match db::connect(&config.database_path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("DB connection failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("Migrations failed: {e}");
        std::process::exit(1);
    }

    for (seeder, name) in [
        (Box::new(UserSeeder) as Box<dyn Seeder + Send + Sync>, "User"),
        (Box::new(OmbudsmanTicketSeeder), "OmbudsmanTicket"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
