//! Database module for handling PostgreSQL connections and operations
//!
//! This module provides connection pooling, configuration, and health checks
//! for the PostgreSQL database.

use crate::error::{DatabaseError, DatabaseResult};
use sqlx::{
    PgPool, Pool, Postgres,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::env;
use std::time::Duration;
use tracing::{error, info};

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Where and how to connect
    pub connect_options: PgConnectOptions,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub connection_timeout: u64,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: full PostgreSQL connection URL. When unset the
    ///   connection is described by `DB_HOST`, `DB_PORT` (default: 5432),
    ///   `DB_USER`, `DB_PASS`, `DB_NAME` and `DB_SSLMODE` (default: disable),
    ///   taken verbatim with no URL escaping required
    /// - `DATABASE_MAX_CONNECTIONS`: Maximum number of connections (default: 5)
    /// - `DATABASE_CONNECTION_TIMEOUT`: Acquire timeout in seconds (default: 30)
    pub fn from_env() -> DatabaseResult<Self> {
        let connect_options = match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url.parse().map_err(|e| {
                DatabaseError::Configuration(format!("Invalid database URL: {}", e))
            })?,
            _ => Self::options_from_parts()?,
        };

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let connection_timeout = env::var("DATABASE_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            connect_options,
            max_connections,
            connection_timeout,
        })
    }

    fn options_from_parts() -> DatabaseResult<PgConnectOptions> {
        let required = |key: &str| {
            env::var(key)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    DatabaseError::Configuration(format!(
                        "neither DATABASE_URL nor {} is set",
                        key
                    ))
                })
        };

        let host = required("DB_HOST")?;
        let user = required("DB_USER")?;
        let name = required("DB_NAME")?;

        let port = match env::var("DB_PORT") {
            Ok(port) if !port.is_empty() => port.parse::<u16>().map_err(|_| {
                DatabaseError::Configuration(format!("DB_PORT is not a valid port: {}", port))
            })?,
            _ => 5432,
        };

        let ssl_mode = match env::var("DB_SSLMODE") {
            Ok(mode) if !mode.is_empty() => mode.parse::<PgSslMode>().map_err(|e| {
                DatabaseError::Configuration(format!("Invalid DB_SSLMODE: {}", e))
            })?,
            _ => PgSslMode::Disable,
        };

        let mut options = PgConnectOptions::new()
            .host(&host)
            .port(port)
            .username(&user)
            .database(&name)
            .ssl_mode(ssl_mode);

        if let Ok(password) = env::var("DB_PASS") {
            if !password.is_empty() {
                options = options.password(&password);
            }
        }

        Ok(options)
    }
}

/// Initialize a PostgreSQL connection pool
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<Pool<Postgres>>` - PostgreSQL connection pool or error
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<Pool<Postgres>> {
    info!("Initializing database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_with(config.connect_options.clone())
        .await
        .map_err(DatabaseError::Connection)?;

    info!("Database connection pool initialized successfully");
    Ok(pool)
}

/// Check database connectivity
///
/// # Arguments
///
/// * `pool` - PostgreSQL connection pool
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if connection is successful, false otherwise
pub async fn health_check(pool: &PgPool) -> DatabaseResult<bool> {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => Ok(true),
        Err(e) => {
            error!("Database health check failed: {}", e);
            Ok(false)
        }
    }
}
