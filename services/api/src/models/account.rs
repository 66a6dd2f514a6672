//! Account model and authentication payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account entity
///
/// The password hash never leaves the process: it is skipped on
/// serialization.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

/// New account creation payload, with the password already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// Email and password as submitted to `/register` and `/login`
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
