//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{CurrentAccount, auth_middleware},
    models::{Credentials, InternshipInput, NewAccount, ProfileInput},
    password,
    state::AppState,
    validation::{validate_email, validate_internship, validate_password},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/profile", get(get_profile).put(save_profile))
        .route("/recommendations", get(get_recommendations))
        .route("/internships", post(create_internship))
        .route("/internships/:id", put(update_internship))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/internships", get(list_internships))
        .route("/internships/active", get(list_active_internships))
        .route("/internships/:id", get(get_internship))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::validation(rejection.body_text())
}

fn bad_internship_id(_: PathRejection) -> ApiError {
    ApiError::validation("invalid internship ID")
}

fn email_taken() -> ApiError {
    ApiError::validation("email already registered")
}

fn bad_credentials() -> ApiError {
    ApiError::unauthenticated("invalid email or password")
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "internmatch-api"
    }))
}

/// Register a new account
///
/// No token is issued; the client logs in separately.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(bad_json)?;
    validate_email(&payload.email).map_err(ApiError::validation)?;
    validate_password(&payload.password).map_err(ApiError::validation)?;

    if state
        .store
        .find_account_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(email_taken());
    }

    let password_hash = password::hash_async(payload.password).await?;
    let new_account = NewAccount {
        email: payload.email,
        password_hash,
    };

    // a concurrent registration can still win the unique constraint
    let account = state
        .store
        .create_account(&new_account)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                email_taken()
            } else {
                ApiError::from(e)
            }
        })?;

    info!(account_id = account.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "registration successful"})),
    ))
}

/// Exchange credentials for an access token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(bad_json)?;
    validate_email(&payload.email).map_err(ApiError::validation)?;
    if payload.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let Some(account) = state.store.find_account_by_email(&payload.email).await? else {
        password::verify_decoy_async(payload.password).await;
        return Err(bad_credentials());
    };

    if !password::verify_async(payload.password, account.password_hash.clone()).await {
        return Err(bad_credentials());
    }

    let token = state.jwt_service.issue(account.id).map_err(|e| {
        error!("Failed to issue token: {}", e);
        ApiError::from(e)
    })?;

    info!(account_id = account.id, "Login succeeded");

    Ok(Json(json!({ "token": token })))
}

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .store
        .find_profile_by_account_id(current.id())
        .await?
        .ok_or_else(|| ApiError::not_found("profile not found"))?;

    Ok(Json(profile))
}

/// Create or replace the caller's profile and mark it complete
pub async fn save_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(bad_json)?;

    let profile = state.store.upsert_profile(current.id(), &payload).await?;
    state.store.set_profile_complete(current.id(), true).await?;

    info!(account_id = current.id(), "Profile saved");

    Ok(Json(json!({
        "message": "profile updated",
        "profile": profile
    })))
}

/// Recommend internships for the caller
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
) -> ApiResult<impl IntoResponse> {
    let recommendations = state
        .recommendation_service
        .recommend(current.account())
        .await?;

    Ok(Json(recommendations))
}

/// List all internships, newest first
pub async fn list_internships(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let internships = state.store.list_internships().await?;
    Ok(Json(internships))
}

/// List active internships
pub async fn list_active_internships(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let internships = state.store.list_active_internships().await?;
    Ok(Json(internships))
}

/// Get an internship by ID
pub async fn get_internship(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id.map_err(bad_internship_id)?;

    let internship = state
        .store
        .find_internship_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("internship not found"))?;

    Ok(Json(internship))
}

/// Create an internship
pub async fn create_internship(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    payload: Result<Json<InternshipInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(bad_json)?;
    validate_internship(&payload).map_err(ApiError::validation)?;

    let internship = state.store.create_internship(&payload).await?;

    info!(
        account_id = current.id(),
        internship_id = internship.id,
        "Internship created"
    );

    Ok((StatusCode::CREATED, Json(internship)))
}

/// Replace an internship's fields
pub async fn update_internship(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<InternshipInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id.map_err(bad_internship_id)?;
    let Json(payload) = payload.map_err(bad_json)?;
    validate_internship(&payload).map_err(ApiError::validation)?;

    let internship = state
        .store
        .update_internship(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("internship not found"))?;

    info!(
        account_id = current.id(),
        internship_id = id,
        "Internship updated"
    );

    Ok(Json(internship))
}
