//! Logging setup and runtime logging control.
//!
//! `init_logging` installs the global `tracing` subscriber (rolling file plus an
//! optional stdout layer) behind a reloadable `EnvFilter`. The returned
//! [`LogControl`] is the only way to change logging at runtime; it is stored in
//! the application state and handed to whoever needs to reconfigure logging.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use thiserror::Error;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::AppConfig;

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log directives '{directives}': {reason}")]
    Directives { directives: String, reason: String },

    #[error("failed to reload log filter: {0}")]
    Reload(String),

    #[error("failed to install global subscriber: {0}")]
    Install(String),
}

/// Snapshot of the active logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    pub enabled: bool,
    pub directives: String,
}

/// Handle for reconfiguring logging after startup.
///
/// Cloning is cheap; all clones share the same settings and filter handle.
#[derive(Clone)]
pub struct LogControl {
    handle: Option<FilterHandle>,
    settings: Arc<RwLock<LogSettings>>,
}

impl LogControl {
    /// A control that tracks settings without a subscriber behind it.
    ///
    /// Used by tests and tools that never install the global subscriber.
    pub fn detached(directives: impl Into<String>) -> Self {
        Self {
            handle: None,
            settings: Arc::new(RwLock::new(LogSettings {
                enabled: true,
                directives: directives.into(),
            })),
        }
    }

    pub fn settings(&self) -> LogSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Turns logging on (with the configured directives) or off.
    pub fn reconfigure(&self, enabled: bool) -> Result<LogSettings, LogError> {
        let mut settings = self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = &self.handle {
            let filter = if enabled {
                parse_filter(&settings.directives)?
            } else {
                EnvFilter::new("off")
            };
            handle
                .reload(filter)
                .map_err(|e| LogError::Reload(e.to_string()))?;
        }

        settings.enabled = enabled;
        Ok(settings.clone())
    }
}

fn parse_filter(directives: &str) -> Result<EnvFilter, LogError> {
    EnvFilter::try_new(directives).map_err(|e| LogError::Directives {
        directives: directives.to_string(),
        reason: e.to_string(),
    })
}

/// Installs the global subscriber described by `config`.
///
/// The returned guard flushes the non-blocking file writer on drop and must be
/// kept alive for the lifetime of the process.
pub fn init_logging(config: &AppConfig) -> Result<(LogControl, WorkerGuard), LogError> {
    std::fs::create_dir_all(&config.log_dir).ok();

    let file_appender = rolling::daily(&config.log_dir, &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let (filter, handle) = reload::Layer::new(parse_filter(&config.log_level)?);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config.log_to_stdout.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| LogError::Install(e.to_string()))?;

    let control = LogControl {
        handle: Some(handle),
        settings: Arc::new(RwLock::new(LogSettings {
            enabled: true,
            directives: config.log_level.clone(),
        })),
    };

    Ok((control, guard))
}
