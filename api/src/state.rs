use std::sync::Arc;

use db::repositories::{SeaOrmTicketStore, SeaOrmUserDirectory, UserDirectory};
use jsonwebtoken::{DecodingKey, EncodingKey};
use sea_orm::DatabaseConnection;
use services::ombudsman::{OmbudsmanService, ReplyDispatcher};
use util::config::AppConfig;
use util::logging::LogControl;

/// Everything handlers and guards need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ombudsman: OmbudsmanService,
    directory: Arc<dyn UserDirectory>,
    log_control: LogControl,
    jwt_encoding_key: EncodingKey,
    jwt_decoding_key: DecodingKey,
    jwt_duration_minutes: i64,
    session_cookie_name: String,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: &AppConfig,
        dispatcher: ReplyDispatcher,
        log_control: LogControl,
    ) -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(SeaOrmUserDirectory::new(db.clone()));
        let store = Arc::new(SeaOrmTicketStore::new(db.clone()));
        let ombudsman = OmbudsmanService::new(store, directory.clone(), dispatcher);

        Self {
            db,
            ombudsman,
            directory,
            log_control,
            jwt_encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            jwt_decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            jwt_duration_minutes: i64::try_from(config.jwt_duration_minutes).unwrap_or(i64::MAX),
            session_cookie_name: config.session_cookie_name.clone(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn ombudsman(&self) -> &OmbudsmanService {
        &self.ombudsman
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    pub fn log_control(&self) -> &LogControl {
        &self.log_control
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_decoding_key
    }

    pub fn jwt_duration_minutes(&self) -> i64 {
        self.jwt_duration_minutes
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }
}
