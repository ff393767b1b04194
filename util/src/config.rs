//! Application configuration.
//!
//! `AppConfig` is loaded once at startup from `.env` and the process environment
//! and then handed to whatever needs it (state, logging, mailer). Nothing reads
//! the environment after `from_env` returns.

use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

/// Largest offset `chrono::FixedOffset` accepts, in whole minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 23 * 60 + 59;
const MAX_RETRY_BACKOFF_MS: u64 = 10 * 60 * 1000;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub session_cookie_name: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from_address: String,
    pub email_from_name: String,
    pub institution_name: String,
    pub display_utc_offset_minutes: i32,
    pub mail_max_attempts: u32,
    pub mail_retry_backoff_ms: u64,
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// `DATABASE_PATH` and `JWT_SECRET` are required; every other key has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let smtp_username = var_or_default("SMTP_USERNAME", "");

        Ok(Self {
            env: var_or_default("APP_ENV", "development"),
            project_name: var_or_default("PROJECT_NAME", "ouvidoria-admin"),
            log_level: var_or_default("LOG_LEVEL", "api=info,services=info,db=info"),
            log_dir: var_or_default("LOG_DIR", "logs"),
            log_file: var_or_default("LOG_FILE", "api.log"),
            log_to_stdout: parse_or("LOG_TO_STDOUT", false)?,
            database_path: required("DATABASE_PATH")?,
            host: var_or_default("HOST", "127.0.0.1"),
            port: parse_or("PORT", 3000)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_duration_minutes: parse_or("JWT_DURATION_MINUTES", 60)?,
            session_cookie_name: var_or_default("SESSION_COOKIE_NAME", "session"),
            smtp_host: var_or_default("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: parse_or("SMTP_PORT", 587)?,
            email_from_address: var_or_default("EMAIL_FROM_ADDRESS", &smtp_username),
            smtp_username,
            smtp_password: var_or_default("SMTP_PASSWORD", ""),
            email_from_name: var_or_default("EMAIL_FROM_NAME", "Ouvidoria"),
            institution_name: var_or_default("INSTITUTION_NAME", "Ouvidoria"),
            display_utc_offset_minutes: parse_in_range(
                "DISPLAY_UTC_OFFSET_MINUTES",
                -180,
                -MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES,
            )?,
            mail_max_attempts: parse_or("MAIL_MAX_ATTEMPTS", 3)?,
            mail_retry_backoff_ms: parse_in_range("MAIL_RETRY_BACKOFF_MS", 2000, 0..=MAX_RETRY_BACKOFF_MS)?,
        })
    }

    /// True when both SMTP credentials are present.
    ///
    /// Without them reply notifications are disabled rather than failing.
    pub fn mail_configured(&self) -> bool {
        !self.smtp_username.trim().is_empty() && !self.smtp_password.trim().is_empty()
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

fn var_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_in_range<T>(key: &'static str, default: T, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Display,
{
    let value = parse_or(key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}
