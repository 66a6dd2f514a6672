//! Authentication middleware for protected routes
//!
//! A request is admitted only when its `Authorization: Bearer <token>`
//! header carries a token that verifies and whose subject still names an
//! existing account. The resolved account is attached to the request as a
//! [`CurrentAccount`]; nothing else in the crate can construct one.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    models::Account,
    state::AppState,
};

/// The authenticated account for the current request
///
/// Handlers read it with `Extension<CurrentAccount>`.
#[derive(Debug, Clone)]
pub struct CurrentAccount(Account);

impl CurrentAccount {
    pub(crate) fn new(account: Account) -> Self {
        Self(account)
    }

    pub fn account(&self) -> &Account {
        &self.0
    }

    pub fn id(&self) -> i64 {
        self.0.id
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    let account = authenticate(&state, req.headers()).await?;

    req.extensions_mut().insert(CurrentAccount::new(account));

    Ok(next.run(req).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<Account> {
    let token =
        bearer_token(headers).ok_or_else(|| ApiError::unauthenticated("missing or invalid token"))?;

    let claims = state.jwt_service.verify(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::unauthenticated("invalid token")
    })?;
    let account_id = claims
        .account_id()
        .map_err(|_| ApiError::unauthenticated("invalid token"))?;

    state
        .store
        .find_account_by_id(account_id)
        .await?
        .ok_or_else(|| {
            debug!("Token subject {} no longer exists", account_id);
            ApiError::unauthenticated("user not found")
        })
}

/// Extract the token from a `Bearer` authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
