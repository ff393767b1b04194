pub mod models;
pub mod repositories;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::path::Path;

/// Turns a configured database location into a connection URL.
///
/// DSNs pass through unchanged; anything else is treated as a SQLite file path.
pub fn database_url(path_or_url: &str) -> String {
    if path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("mysql://")
    {
        return path_or_url.to_string();
    }

    // SQLite won't create intermediate dirs.
    if let Some(parent) = Path::new(path_or_url).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    format!("sqlite://{path_or_url}?mode=rwc")
}

pub async fn connect(path_or_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url(path_or_url)).await
}
