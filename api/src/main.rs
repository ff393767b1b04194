use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::Context;
use api::state::AppState;
use db::models::system_setting::{LOGS_ENABLED_KEY, Model as SystemSetting};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use services::ombudsman::ReplyDispatcher;
use util::config::AppConfig;
use util::logging::{LogControl, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (log_control, _log_guard) = match init_logging(&config) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(config, log_control).await {
        tracing::error!(error = %format!("{e:#}"), "Server stopped");
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(config: AppConfig, log_control: LogControl) -> anyhow::Result<()> {
    let db = db::connect(&config.database_path)
        .await
        .with_context(|| format!("failed to open database '{}'", config.database_path))?;

    Migrator::up(&db, None)
        .await
        .context("failed to apply migrations")?;

    if let Some(enabled) = SystemSetting::get_bool(&db, LOGS_ENABLED_KEY)
        .await
        .context("failed to read persisted logging setting")?
    {
        log_control
            .reconfigure(enabled)
            .context("failed to apply persisted logging setting")?;
    }

    let dispatcher =
        ReplyDispatcher::from_config(&config).context("failed to configure the mailer")?;

    let app_state = AppState::new(db, &config, dispatcher, log_control);
    let app = api::app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, env = %config.env, "Starting {}", config.project_name);
    println!("Starting {} on http://{}", config.project_name, addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server crashed")?;

    Ok(())
}
