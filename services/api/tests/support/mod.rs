//! Shared fixtures for the integration tests: an in-memory store, a
//! scripted scoring service and request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use common::error::{DatabaseError, DatabaseResult};
use serde_json::Value;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Mutex;
use tower::ServiceExt;

use internmatch_api::{
    AppState,
    jwt::{JwtConfig, JwtService},
    models::{Account, Internship, InternshipInput, NewAccount, Profile, ProfileInput},
    repositories::Store,
    scoring::{ScoringError, ScoringService},
};

pub const TEST_SECRET: &str = "integration-test-secret-32-characters";

pub fn jwt_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 3600,
    })
    .unwrap()
}

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    profiles: Vec<Profile>,
    internships: Vec<Internship>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// The row `PgStore` would hold for a saved profile
pub fn stored_profile(input: ProfileInput, id: i64, account_id: i64) -> Profile {
    Profile {
        id,
        account_id,
        name: input.name,
        phone: input.phone,
        education: input.education,
        cgpa: input.cgpa,
        skills: input.skills,
        experience: input.experience,
        social_links: input.social_links,
        location: input.location,
        interest: input.interest,
        resume_link: input.resume_link,
        preferred_job_type: input.preferred_job_type,
        availability: input.availability,
        languages: input.languages,
    }
}

/// The row `PgStore` would insert; an unset `active` becomes `true`
pub fn stored_internship(input: InternshipInput, id: i64, posted_at: DateTime<Utc>) -> Internship {
    Internship {
        id,
        title: input.title,
        organization: input.organization,
        location: input.location,
        stipend_inr: input.stipend_inr,
        duration: input.duration,
        skills_req: input.skills_req,
        langs_req: input.langs_req,
        active: Some(input.active.unwrap_or(true)),
        posted_at,
        deadline: input.deadline,
        apply_url: input.apply_url,
        description: input.description,
        min_cgpa: input.min_cgpa,
        experience: input.experience,
    }
}

/// In-memory [`Store`] that counts hydration queries
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    hydration_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn hydration_queries(&self) -> usize {
        self.hydration_queries.load(Ordering::SeqCst)
    }

    pub async fn insert_account(&self, email: &str, profile_complete: bool) -> Account {
        let mut tables = self.tables.lock().await;
        let account = Account {
            id: tables.next_id(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            profile_complete,
            created_at: Utc::now(),
        };
        tables.accounts.push(account.clone());
        account
    }

    pub async fn remove_account(&self, id: i64) {
        let mut tables = self.tables.lock().await;
        tables.accounts.retain(|a| a.id != id);
        tables.profiles.retain(|p| p.account_id != id);
    }

    pub async fn account(&self, id: i64) -> Option<Account> {
        let tables = self.tables.lock().await;
        tables.accounts.iter().find(|a| a.id == id).cloned()
    }

    pub async fn account_by_email(&self, email: &str) -> Option<Account> {
        let tables = self.tables.lock().await;
        tables.accounts.iter().find(|a| a.email == email).cloned()
    }

    pub async fn insert_profile(&self, account_id: i64, input: ProfileInput) -> Profile {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let profile = stored_profile(input, id, account_id);
        tables.profiles.push(profile.clone());
        profile
    }

    /// Insert an internship under a fixed id
    pub async fn insert_internship(&self, id: i64, active: Option<bool>) -> Internship {
        let mut internship = stored_internship(
            internship_input(&format!("Internship {}", id)),
            id,
            Utc::now() - Duration::minutes(id),
        );
        internship.active = active;
        let mut tables = self.tables.lock().await;
        tables.next_id = tables.next_id.max(id);
        tables.internships.push(internship.clone());
        internship
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_account_by_id(&self, id: i64) -> DatabaseResult<Option<Account>> {
        Ok(self.account(id).await)
    }

    async fn find_account_by_email(&self, email: &str) -> DatabaseResult<Option<Account>> {
        Ok(self.account_by_email(email).await)
    }

    async fn create_account(&self, new_account: &NewAccount) -> DatabaseResult<Account> {
        let mut tables = self.tables.lock().await;
        if tables.accounts.iter().any(|a| a.email == new_account.email) {
            return Err(DatabaseError::UniqueViolation(
                "accounts_email_key".to_string(),
            ));
        }
        let account = Account {
            id: tables.next_id(),
            email: new_account.email.clone(),
            password_hash: new_account.password_hash.clone(),
            profile_complete: false,
            created_at: Utc::now(),
        };
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_profile_by_account_id(&self, account_id: i64) -> DatabaseResult<Option<Profile>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.account_id == account_id)
            .cloned())
    }

    async fn upsert_profile(
        &self,
        account_id: i64,
        input: &ProfileInput,
    ) -> DatabaseResult<Profile> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .profiles
            .iter_mut()
            .find(|p| p.account_id == account_id)
        {
            *existing = stored_profile(input.clone(), existing.id, account_id);
            return Ok(existing.clone());
        }
        let id = tables.next_id();
        let profile = stored_profile(input.clone(), id, account_id);
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn set_profile_complete(&self, account_id: i64, complete: bool) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(account) = tables.accounts.iter_mut().find(|a| a.id == account_id) {
            account.profile_complete = complete;
        }
        Ok(())
    }

    async fn find_internships_by_ids(&self, ids: &[i64]) -> DatabaseResult<Vec<Internship>> {
        self.hydration_queries.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        // storage order, not request order
        Ok(tables
            .internships
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn create_internship(&self, input: &InternshipInput) -> DatabaseResult<Internship> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let internship = stored_internship(input.clone(), id, Utc::now());
        tables.internships.push(internship.clone());
        Ok(internship)
    }

    async fn update_internship(
        &self,
        id: i64,
        input: &InternshipInput,
    ) -> DatabaseResult<Option<Internship>> {
        let mut tables = self.tables.lock().await;
        let Some(existing) = tables.internships.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        let mut updated = stored_internship(input.clone(), id, existing.posted_at);
        updated.active = input.active;
        *existing = updated.clone();
        Ok(Some(updated))
    }

    async fn find_internship_by_id(&self, id: i64) -> DatabaseResult<Option<Internship>> {
        let tables = self.tables.lock().await;
        Ok(tables.internships.iter().find(|i| i.id == id).cloned())
    }

    async fn list_internships(&self) -> DatabaseResult<Vec<Internship>> {
        let tables = self.tables.lock().await;
        let mut internships = tables.internships.clone();
        internships.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(internships)
    }

    async fn list_active_internships(&self) -> DatabaseResult<Vec<Internship>> {
        let mut internships = self.list_internships().await?;
        internships.retain(|i| i.active == Some(true));
        Ok(internships)
    }
}

/// Scoring service with a scripted answer that counts its calls
pub struct FakeScorer {
    answer: Result<Vec<i64>, ScoringError>,
    calls: AtomicUsize,
}

impl FakeScorer {
    pub fn returning(ids: Vec<i64>) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(ids),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: ScoringError) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(err),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringService for FakeScorer {
    async fn score(&self, _profile: &Profile) -> Result<Vec<i64>, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

pub fn app_state(store: Arc<MemoryStore>, scorer: Arc<FakeScorer>) -> AppState {
    AppState::new(store, jwt_service(), scorer)
}

pub fn profile_input() -> ProfileInput {
    ProfileInput {
        name: "Asha".to_string(),
        education: "B.Tech".to_string(),
        cgpa: 8.4,
        skills: vec!["rust".to_string(), "sql".to_string()],
        languages: vec!["english".to_string(), "hindi".to_string()],
        location: "Bengaluru".to_string(),
        ..ProfileInput::default()
    }
}

pub fn internship_input(title: &str) -> InternshipInput {
    InternshipInput {
        title: title.to_string(),
        organization: "Acme Labs".to_string(),
        location: "Pune".to_string(),
        stipend_inr: 20000,
        duration: 3,
        skills_req: vec!["rust".to_string()],
        langs_req: vec!["english".to_string()],
        active: None,
        deadline: Utc::now() + Duration::days(30),
        apply_url: "https://acme.example/apply".to_string(),
        description: "Work on the matching engine".to_string(),
        min_cgpa: 7.0,
        experience: 0,
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Drive one request through the router and decode the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
