use std::env;
use std::time::Duration;

use crate::error::{ AppError, Result };

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub email_function_url: String,
    pub email_function_key: Option<String>,
    pub notification_poll_interval: Duration,
    pub notification_batch_size: u64,
    pub notification_max_attempts: i32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self> where F: Fn(&str) -> Option<String> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| AppError::Config(format!("{} must be set", key)))
        };

        let database_url = required("DATABASE_URL")?;
        let email_function_url = required("EMAIL_FUNCTION_URL")?;
        let email_function_key = get("EMAIL_FUNCTION_KEY");

        let server_host = get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = Self::parse_or(get("SERVER_PORT"), "SERVER_PORT", 8080u16)?;

        let poll_seconds = Self::parse_or(
            get("NOTIFICATION_POLL_SECONDS"),
            "NOTIFICATION_POLL_SECONDS",
            30u64
        )?;
        if poll_seconds == 0 {
            return Err(AppError::Config("NOTIFICATION_POLL_SECONDS must be positive".to_string()));
        }

        let notification_batch_size = Self::parse_or(
            get("NOTIFICATION_BATCH_SIZE"),
            "NOTIFICATION_BATCH_SIZE",
            50u64
        )?;
        let notification_max_attempts = Self::parse_or(
            get("NOTIFICATION_MAX_ATTEMPTS"),
            "NOTIFICATION_MAX_ATTEMPTS",
            5i32
        )?;
        if notification_max_attempts < 1 {
            return Err(AppError::Config("NOTIFICATION_MAX_ATTEMPTS must be at least 1".to_string()));
        }

        Ok(Config {
            database_url,
            server_host,
            server_port,
            email_function_url,
            email_function_key,
            notification_poll_interval: Duration::from_secs(poll_seconds),
            notification_batch_size,
            notification_max_attempts,
        })
    }

    fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
        match value {
            Some(raw) =>
                raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
            None => Ok(default),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
