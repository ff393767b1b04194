use std::sync::Arc;
use std::time::Duration;

use api::auth::generate_jwt;
use api::state::AppState;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use db::models::user::{Model as UserModel, UserRole};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use services::mailer::MemoryMailer;
use services::ombudsman::{NotificationSettings, ReplyDispatcher};
use util::config::AppConfig;
use util::logging::LogControl;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: DatabaseConnection,
    pub mailer: MemoryMailer,
}

impl TestApp {
    /// Creates a user with `role` and returns it with a session token.
    pub async fn user(&self, name: &str, role: UserRole) -> (UserModel, String) {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let user = UserModel::create(&self.db, name, &email, role).await.unwrap();
        let (token, _) = generate_jwt(&user.id, &self.state).unwrap();
        (user, token)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: "test".into(),
        project_name: "ouvidoria-admin".into(),
        log_level: "api=info,services=info,db=info".into(),
        log_dir: "logs".into(),
        log_file: "api.log".into(),
        log_to_stdout: false,
        database_path: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "test-secret".into(),
        jwt_duration_minutes: 60,
        session_cookie_name: "session".into(),
        smtp_host: "smtp.example.com".into(),
        smtp_port: 587,
        smtp_username: String::new(),
        smtp_password: String::new(),
        email_from_address: String::new(),
        email_from_name: "Ouvidoria".into(),
        institution_name: "Ouvidoria".into(),
        display_utc_offset_minutes: -180,
        mail_max_attempts: 3,
        mail_retry_backoff_ms: 5,
    }
}

/// The full application over a fresh in-memory database, with replies
/// delivered to a `MemoryMailer`.
pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;
    let config = test_config();
    let mailer = MemoryMailer::new();

    let dispatcher = ReplyDispatcher::start(
        Arc::new(mailer.clone()),
        NotificationSettings {
            retry_backoff: Duration::from_millis(config.mail_retry_backoff_ms),
            ..NotificationSettings::from_config(&config)
        },
    );
    let state = AppState::new(
        db.clone(),
        &config,
        dispatcher,
        LogControl::detached(config.log_level.clone()),
    );

    TestApp {
        router: api::app(state.clone()),
        state,
        db,
        mailer,
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Cookie", format!("session={token}"));
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
