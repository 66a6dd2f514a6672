//! Applicant profile model

use serde::{Deserialize, Serialize};

/// Profile entity, one per account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub phone: String,
    pub education: String,
    pub cgpa: f32,
    pub skills: Vec<String>,
    pub experience: i32,
    pub social_links: Vec<String>,
    pub location: String,
    pub interest: String,
    pub resume_link: String,
    pub preferred_job_type: String,
    pub availability: String,
    pub languages: Vec<String>,
}

/// Profile save payload
///
/// Every field is optional on the wire; absent fields are stored as their
/// empty value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub name: String,
    pub phone: String,
    pub education: String,
    pub cgpa: f32,
    pub skills: Vec<String>,
    pub experience: i32,
    pub social_links: Vec<String>,
    pub location: String,
    pub interest: String,
    pub resume_link: String,
    pub preferred_job_type: String,
    pub availability: String,
    pub languages: Vec<String>,
}
