//! Internship listing model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internship entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Internship {
    pub id: i64,
    pub title: String,
    pub organization: String,
    pub location: String,
    pub stipend_inr: i32,
    pub duration: i32,
    pub skills_req: Vec<String>,
    pub langs_req: Vec<String>,
    /// Unset on input means active
    pub active: Option<bool>,
    pub posted_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub apply_url: String,
    pub description: String,
    pub min_cgpa: f32,
    pub experience: i32,
}

/// Internship create/update payload
#[derive(Debug, Clone, Deserialize)]
pub struct InternshipInput {
    pub title: String,
    pub organization: String,
    pub location: String,
    pub stipend_inr: i32,
    #[serde(default)]
    pub duration: i32,
    #[serde(default, alias = "skillsreq")]
    pub skills_req: Vec<String>,
    #[serde(default, alias = "langsreq")]
    pub langs_req: Vec<String>,
    #[serde(default)]
    pub active: Option<bool>,
    pub deadline: DateTime<Utc>,
    pub apply_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub min_cgpa: f32,
    #[serde(default)]
    pub experience: i32,
}
