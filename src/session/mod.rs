// Session resolution: opaque cookie token -> authenticated identity.
use axum::http::HeaderMap;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{StoreClient, StoreError};

pub const SESSION_COOKIE: &str = "appwrite-session";
const SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Resolved identity for the current request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// A resolved session: the identity plus a data client bound to the same
/// token for the remainder of the request.
pub struct Session {
    pub identity: Identity,
    pub store: StoreClient,
}

/// Extract the session token from the `Cookie` header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|cookie| {
        let mut parts = cookie.trim().splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(name), Some(value)) if name == SESSION_COOKIE && !value.is_empty() => {
                Some(value.to_string())
            }
            _ => None,
        }
    })
}

/// Resolve the request's session cookie to an authenticated identity.
///
/// Absent cookie -> 401. Token rejected by the provider -> 401 as
/// `InvalidSession`, which also clears the cookie on the way out. This
/// function itself never mutates cookies; cleanup rides on the error type.
pub async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let token = session_token(headers).ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let store = state.session_store(&token);
    let account = store.get_account().await.map_err(|err| match err {
        StoreError::Unauthorized(_) | StoreError::NotFound(_) => {
            tracing::debug!("session token rejected by identity provider");
            ApiError::invalid_session("Session is invalid or expired")
        }
        other => other.into(),
    })?;

    Ok(Session {
        identity: Identity {
            id: account.id,
            email: account.email,
            name: account.name,
        },
        store,
    })
}

/// `Set-Cookie` value that installs a session token.
pub fn session_cookie(secret: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, secret, SESSION_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that deletes the session cookie. Deleting an absent
/// cookie is harmless, which keeps logout idempotent.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0", SESSION_COOKIE)
}
