//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the Miny API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `MINY_MAX_PARTICIPANTS`: Ceiling for group appointment capacity (default: 100)
//! - `MINY_ALLOW_TODAY`: Allow creating appointments for the current day (default: false)
//! - `MINY_SESSION_TTL_HOURS`: Lifetime of a login session (default: 720)
//! - `MINY_FLEXIBLE_DEFAULT_HOUR`: Calendar start hour for flexible slots (default: 10)
//! - `MINY_PUBLIC_URL`: Base URL used in share links (default: "http://localhost:3000")

use eyre::{ensure, Result, WrapErr};
use miny_core::{
    calendar::CalendarConfig,
    validation::{LifecycleConfig, DEFAULT_MAX_PARTICIPANTS, MIN_PARTICIPANTS},
};
use std::env;
use tracing::Level;

/// Ten years; keeps session expiry arithmetic far from overflow.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Configuration for the Miny API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    pub max_participants: u32,
    pub allow_today: bool,
    pub session_ttl_hours: i64,
    pub flexible_default_hour: u32,
    pub public_url: String,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - A `MINY_*` numeric value cannot be parsed or is out of range
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Appointment rules
        let max_participants = env::var("MINY_MAX_PARTICIPANTS")
            .unwrap_or_else(|_| DEFAULT_MAX_PARTICIPANTS.to_string())
            .parse()
            .wrap_err("Invalid MINY_MAX_PARTICIPANTS value")?;
        let allow_today = env::var("MINY_ALLOW_TODAY")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let session_ttl_hours = env::var("MINY_SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "720".to_string())
            .parse()
            .wrap_err("Invalid MINY_SESSION_TTL_HOURS value")?;
        let flexible_default_hour = env::var("MINY_FLEXIBLE_DEFAULT_HOUR")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .wrap_err("Invalid MINY_FLEXIBLE_DEFAULT_HOUR value")?;
        let public_url = env::var("MINY_PUBLIC_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let config = Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            max_participants,
            allow_today,
            session_ttl_hours,
            flexible_default_hour,
            public_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            i64::from(self.max_participants) >= MIN_PARTICIPANTS,
            "MINY_MAX_PARTICIPANTS must be at least {}, got {}",
            MIN_PARTICIPANTS,
            self.max_participants
        );
        ensure!(
            (1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours),
            "MINY_SESSION_TTL_HOURS must be between 1 and {}, got {}",
            MAX_SESSION_TTL_HOURS,
            self.session_ttl_hours
        );
        ensure!(
            self.flexible_default_hour <= 23,
            "MINY_FLEXIBLE_DEFAULT_HOUR must be an hour between 0 and 23, got {}",
            self.flexible_default_hour
        );
        Ok(())
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            max_participants_ceiling: self.max_participants,
            allow_today: self.allow_today,
        }
    }

    pub fn calendar_config(&self) -> CalendarConfig {
        CalendarConfig {
            default_hour: self.flexible_default_hour,
            ..CalendarConfig::default()
        }
    }
}

fn parse_log_level(value: &str) -> Level {
    match value {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
