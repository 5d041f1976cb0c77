// Registration, login and logout. These are the only routes that mint or
// destroy sessions; everything else just resolves the cookie.
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;
use crate::store::DocumentId;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/register
///
/// Creates the identity, then immediately logs in so a successful
/// registration never leaves the user created-but-unauthenticated. The user
/// profile document is best-effort: its failure is logged, not surfaced.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    if !valid_email(email) {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }

    let admin = state.admin_store();
    let account = admin.create_account(email, password, name).await?;
    let token = admin.create_email_session(email, password).await?;

    let identity = &state.config.identity;
    let profile = json!({
        "accountId": account.id,
        "preferences": "{}",
    });
    if let Err(err) = admin
        .create_document(
            &identity.database_id,
            &identity.users_collection,
            DocumentId::Unique,
            profile,
        )
        .await
    {
        tracing::warn!(account_id = %account.id, error = %err, "failed to create user profile document");
    }

    tracing::info!(account_id = %account.id, "registered new account");

    let cookie = session::session_cookie(&token.secret, state.config.is_production());
    let body = json!({
        "user": { "id": account.id, "email": account.email, "name": account.name },
        "session": { "id": token.id },
    });
    Ok((StatusCode::OK, [("set-cookie", cookie)], Json(body)).into_response())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    // Unknown account -> 404, bad credentials -> 401, via the typed store kinds
    let token = state.admin_store().create_email_session(email, password).await?;
    let account = state.session_store(&token.secret).get_account().await?;

    tracing::info!(account_id = %account.id, "login");

    let cookie = session::session_cookie(&token.secret, state.config.is_production());
    let body = json!({
        "user": { "id": account.id, "email": account.email, "name": account.name },
    });
    Ok((StatusCode::OK, [("set-cookie", cookie)], Json(body)).into_response())
}

/// POST+GET /api/auth/logout
///
/// Idempotent: clearing an absent cookie is not an error, and a failed
/// provider-side session deletion still clears the cookie locally.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session::session_token(&headers) {
        if let Err(err) = state.session_store(&token).delete_current_session().await {
            tracing::debug!(error = %err, "provider session deletion failed during logout");
        }
    }

    (
        StatusCode::OK,
        [("set-cookie", session::clear_session_cookie())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// Minimal email shape check: one `@`, non-empty local part and domain, no
/// embedded whitespace.
fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        _ => false,
    }
}
