//! Application configuration loaded from environment variables.

use std::env;

use quill_infra::Argon2Config;
use quill_infra::database::DatabaseConfig;
use quill_infra::mail::SmtpConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL, used in email links.
    pub base_url: String,
    pub database: DatabaseConfig,
    /// SMTP relay; when absent, email links go to the log instead.
    pub smtp: Option<SmtpConfig>,
    /// Password hashing costs, tunable per deployment.
    pub argon2: Argon2Config,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let database = DatabaseConfig {
            url: database_url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        };

        let argon2_defaults = Argon2Config::default();
        let argon2 = Argon2Config {
            memory_kib: env::var("ARGON2_MEMORY_KIB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(argon2_defaults.memory_kib),
            iterations: env::var("ARGON2_ITERATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(argon2_defaults.iterations),
            parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(argon2_defaults.parallelism),
        };

        let smtp = env::var("SMTP_HOST").ok().map(|host| SmtpConfig {
            host,
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from: env::var("SMTP_FROM").unwrap_or_else(|_| "Quill <no-reply@localhost>".to_string()),
            base_url: base_url.clone(),
        });

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url,
            database,
            smtp,
            argon2,
        })
    }
}
