// src/config.rs

use std::{env, net::SocketAddr};

use dotenvy::dotenv;

use crate::error::AppError;

/// Number of entries kept in the class recent-activity log.
pub const ACTIVITY_LOG_CAP: usize = 50;

/// Number of rows returned on the teacher dashboard leaderboard.
pub const DASHBOARD_LEADERBOARD_SIZE: usize = 5;

/// Quiz sessions untouched for this long are dropped.
pub const SESSION_IDLE_TTL_HOURS: i64 = 12;

/// Finished quiz sessions stay reviewable for this long after the last request.
pub const COMPLETED_SESSION_RETENTION_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. The in-memory document store is used when absent.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    /// Optional JSON file replacing the built-in quiz catalog.
    pub quiz_catalog_path: Option<String>,
    /// Optional JSON file replacing the built-in syllabus.
    pub curriculum_path: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::ConfigError("JWT_SECRET must be set".to_string()))?;

        let jwt_expiration = match env::var("JWT_EXPIRATION") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::ConfigError(format!("JWT_EXPIRATION is not a number: {}", raw))
            })?,
            Err(_) => 86_400,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::ConfigError(format!("BIND_ADDR is invalid: {}", e)))?;

        let quiz_catalog_path = env::var("QUIZ_CATALOG_PATH").ok();
        let curriculum_path = env::var("CURRICULUM_PATH").ok();

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ]
            });

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            quiz_catalog_path,
            curriculum_path,
            cors_origins,
        })
    }
}
