//! Process configuration
//!
//! Everything is read from the environment once, at start-up.

use anyhow::Result;
use common::database::DatabaseConfig;

use crate::{jwt::JwtConfig, scoring::ScoringConfig};

/// Default listen address
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub scoring: ScoringConfig,
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - see [`DatabaseConfig::from_env`], [`JwtConfig::from_env`] and
    ///   [`ScoringConfig::from_env`]
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:8080")
    pub fn from_env() -> Result<Self> {
        let database = DatabaseConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let scoring = ScoringConfig::from_env()?;
        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(AppConfig {
            database,
            jwt,
            scoring,
            bind_addr,
        })
    }
}
