//! Client for the external internship scoring service
//!
//! The scoring service is an opaque HTTP endpoint: it receives an
//! applicant profile and answers with internship ids, best match first.
//! Every way the call can go wrong maps to its own [`ScoringError`]
//! variant, and nothing is retried here.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Profile;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Upper bound on the upstream body echoed back in diagnostics
const MAX_DIAGNOSTIC_BODY: usize = 1024;

/// Scoring service configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Endpoint receiving the `POST`
    pub url: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl ScoringConfig {
    /// Create a new ScoringConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SCORING_SERVICE_URL` (or `ML_SERVICE_URL`): scoring endpoint (required)
    /// - `SCORING_TIMEOUT_SECS`: request timeout in seconds (default: 5)
    pub fn from_env() -> Result<Self> {
        let url = ["SCORING_SERVICE_URL", "ML_SERVICE_URL"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| anyhow::anyhow!("SCORING_SERVICE_URL environment variable not set"))?;

        let timeout_secs = std::env::var("SCORING_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(ScoringConfig { url, timeout_secs })
    }
}

/// Scoring call failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// Connect failure, transport error or timeout
    #[error("scoring service unavailable: {0}")]
    Unavailable(String),

    /// Any status other than 200
    #[error("scoring service returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 200 with a body that is not `{"internship_ids": [...]}`
    #[error("scoring service response malformed: {0}")]
    Malformed(String),
}

/// Ranks internships for a profile
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// Internship ids in upstream score order
    async fn score(&self, profile: &Profile) -> Result<Vec<i64>, ScoringError>;
}

/// Outbound request body
#[derive(Debug, Serialize)]
struct ScoringRequest<'a> {
    profile: WireProfile<'a>,
}

/// Profile as the deployed scorer reads it: PascalCase keys, `ID`,
/// `UserID` and `CGPA` in capitals
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireProfile<'a> {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "UserID")]
    user_id: i64,
    name: &'a str,
    phone: &'a str,
    education: &'a str,
    #[serde(rename = "CGPA")]
    cgpa: f32,
    skills: &'a [String],
    experience: i32,
    social_links: &'a [String],
    location: &'a str,
    interest: &'a str,
    resume_link: &'a str,
    preferred_job_type: &'a str,
    availability: &'a str,
    languages: &'a [String],
}

impl<'a> From<&'a Profile> for WireProfile<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.account_id,
            name: &profile.name,
            phone: &profile.phone,
            education: &profile.education,
            cgpa: profile.cgpa,
            skills: &profile.skills,
            experience: profile.experience,
            social_links: &profile.social_links,
            location: &profile.location,
            interest: &profile.interest,
            resume_link: &profile.resume_link,
            preferred_job_type: &profile.preferred_job_type,
            availability: &profile.availability,
            languages: &profile.languages,
        }
    }
}

/// Expected response body
#[derive(Debug, Deserialize)]
struct ScoringResponse {
    internship_ids: Vec<i64>,
}

/// HTTP implementation of [`ScoringService`]
#[derive(Clone)]
pub struct HttpScoringClient {
    client: Client,
    url: String,
}

impl HttpScoringClient {
    /// Create a new client with the configured timeout
    pub fn new(config: ScoringConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            "Scoring client targeting {} (timeout {}s)",
            config.url, config.timeout_secs
        );

        Ok(Self {
            client,
            url: config.url,
        })
    }
}

#[async_trait]
impl ScoringService for HttpScoringClient {
    async fn score(&self, profile: &Profile) -> Result<Vec<i64>, ScoringError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoringRequest {
                profile: profile.into(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Scoring request failed: {}", e);
                ScoringError::Unavailable(describe(&e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read scoring response body: {}", e);
            ScoringError::Unavailable(describe(&e))
        })?;

        if status != StatusCode::OK {
            warn!("Scoring service returned {}", status);
            return Err(ScoringError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(MAX_DIAGNOSTIC_BODY).collect(),
            });
        }

        let parsed: ScoringResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse scoring response: {}", e);
            ScoringError::Malformed(e.to_string())
        })?;

        Ok(parsed.internship_ids)
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    }
}
