// Configuration management

use crate::core::errors::AppError;
use chrono::FixedOffset;
use std::env;

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Application configuration loaded from environment variables
///
/// Runs against PostgreSQL when `DATABASE_URL` is set, otherwise against the
/// in-memory store. All values are validated on load.
#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Database configuration (optional)
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    // Session configuration
    pub session_ttl_days: u32,
    pub cookie_secure: bool,

    // Wall-clock offset for meal windows
    pub meal_utc_offset_minutes: i32,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    pub fn from_env() -> Result<Self, AppError> {
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok();
        }

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0")?,
            port: Self::parse_port()?,
            database_url: Self::get_optional_env("DATABASE_URL")?,
            database_max_connections: Self::parse_u32_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
            run_migrations: Self::parse_bool_or_default("RUN_MIGRATIONS", true)?,
            session_ttl_days: Self::parse_u32_or_default("SESSION_TTL_DAYS", 7)?,
            cookie_secure: Self::parse_bool_or_default("COOKIE_SECURE", false)?,
            meal_utc_offset_minutes: Self::parse_offset_or_default("MEAL_UTC_OFFSET_MINUTES", -180)?,
            request_timeout_secs: Self::parse_u64_or_default("REQUEST_TIMEOUT_SECS", 30)?,
            body_size_limit_bytes: Self::parse_usize_or_default("BODY_SIZE_LIMIT_BYTES", 1024 * 1024)?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info")?,
            log_format: Self::get_env_or_default("LOG_FORMAT", "json")?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Fixed offset applied to UTC before reading the meal-window hour
    pub fn meal_offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.meal_utc_offset_minutes * 60).ok_or_else(|| {
            AppError::ConfigurationError(format!(
                "Invalid MEAL_UTC_OFFSET_MINUTES value '{}'",
                self.meal_utc_offset_minutes
            ))
        })
    }

    fn get_env_or_default(key: &str, default: &str) -> Result<String, AppError> {
        Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
    }

    fn get_optional_env(key: &str) -> Result<Option<String>, AppError> {
        match env::var(key) {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    fn parse_port() -> Result<u16, AppError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            AppError::ConfigurationError(format!("Invalid PORT value '{}': {}", port_str, e))
        })?;

        if port == 0 {
            return Err(AppError::ConfigurationError(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }

    fn parse_u64_or_default(key: &str, default: u64) -> Result<u64, AppError> {
        match env::var(key) {
            Ok(value) => Self::parse_positive(key, &value),
            _ => Ok(default),
        }
    }

    fn parse_u32_or_default(key: &str, default: u32) -> Result<u32, AppError> {
        match env::var(key) {
            Ok(value) => Self::parse_positive(key, &value),
            _ => Ok(default),
        }
    }

    fn parse_usize_or_default(key: &str, default: usize) -> Result<usize, AppError> {
        match env::var(key) {
            Ok(value) => Self::parse_positive(key, &value),
            _ => Ok(default),
        }
    }

    /// Parse a strictly positive number
    fn parse_positive<T>(key: &str, value: &str) -> Result<T, AppError>
    where
        T: std::str::FromStr + Default + PartialEq,
        T::Err: std::fmt::Display,
    {
        let parsed = value.parse::<T>().map_err(|e| {
            AppError::ConfigurationError(format!("Invalid {} value '{}': {}", key, value, e))
        })?;

        if parsed == T::default() {
            return Err(AppError::ConfigurationError(format!(
                "{} must be greater than 0",
                key
            )));
        }

        Ok(parsed)
    }

    fn parse_bool_or_default(key: &str, default: bool) -> Result<bool, AppError> {
        match env::var(key) {
            Ok(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(AppError::ConfigurationError(format!(
                    "Invalid {} value '{}': expected true or false",
                    key, value
                ))),
            },
            _ => Ok(default),
        }
    }

    fn parse_offset_or_default(key: &str, default: i32) -> Result<i32, AppError> {
        let minutes = match env::var(key) {
            Ok(value) => value.parse::<i32>().map_err(|e| {
                AppError::ConfigurationError(format!("Invalid {} value '{}': {}", key, value, e))
            })?,
            _ => default,
        };

        if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(AppError::ConfigurationError(format!(
                "{} must be within ±{} minutes",
                key, MAX_UTC_OFFSET_MINUTES
            )));
        }

        Ok(minutes)
    }

    fn validate(&self) -> Result<(), AppError> {
        if let Some(ref url) = self.database_url {
            Self::validate_url(url, "Database URL")?;
        }

        self.meal_offset()?;

        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    fn validate_url(url: &str, description: &str) -> Result<(), AppError> {
        url::Url::parse(url).map_err(|e| {
            AppError::ConfigurationError(format!("Invalid {} '{}': {}", description, url, e))
        })?;
        Ok(())
    }

    fn validate_log_level(level: &str) -> Result<(), AppError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(AppError::ConfigurationError(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    fn validate_log_format(format: &str) -> Result<(), AppError> {
        if format != "json" && format != "text" {
            return Err(AppError::ConfigurationError(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Configuration for tests; bypasses the environment entirely
    pub fn test_config() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            database_url: None,
            database_max_connections: 10,
            run_migrations: false,
            session_ttl_days: 7,
            cookie_secure: false,
            meal_utc_offset_minutes: 0,
            request_timeout_secs: 30,
            body_size_limit_bytes: 1024 * 1024,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
