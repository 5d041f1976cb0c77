// Company research: validation, rate limiting, then forwarding to the
// search provider. The session is optional here and resolved best-effort.
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use super::client_ip;
use crate::error::ApiError;
use crate::research::ResearchError;
use crate::session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    #[serde(alias = "companyName")]
    pub company: Option<String>,
    pub domain: Option<String>,
}

/// POST /api/company-research
pub async fn company_research(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ResearchRequest>,
) -> Result<Response, ApiError> {
    let company = payload
        .company
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Company name is required"))?
        .to_string();
    let domain = payload
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    // Auth is optional: an invalid or absent cookie must not fail research
    let account_id = match session::session_token(&headers) {
        Some(_) => match session::resolve(&state, &headers).await {
            Ok(session) => Some(session.identity.id),
            Err(_) => None,
        },
        None => None,
    };

    let ip = client_ip(&headers);
    let decision = state
        .rate_limiter()
        .check(&format!("ratelimit:research:{}", ip))
        .await;

    if !decision.allowed {
        tracing::info!(%ip, "research request rejected by rate limiter");
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            [
                ("x-ratelimit-limit", decision.limit.to_string()),
                ("x-ratelimit-remaining", decision.remaining.to_string()),
                ("x-ratelimit-reset", decision.reset.to_string()),
            ],
            Json(json!({
                "error": "Rate limit exceeded",
                "limit": decision.limit,
                "remaining": decision.remaining,
                "reset": decision.reset,
            })),
        )
            .into_response());
    }

    tracing::info!(%company, account_id = ?account_id, "running company research");

    let report = state
        .research_client()
        .research(&company, domain.as_deref())
        .await
        .map_err(|err| match err {
            ResearchError::NotConfigured => {
                ApiError::internal("Research service is not configured", None)
            }
            other => {
                tracing::error!(error = %other, "company research failed");
                ApiError::internal("Company research failed", Some(other.to_string()))
            }
        })?;

    Ok((
        StatusCode::OK,
        [
            ("x-ratelimit-limit", decision.limit.to_string()),
            ("x-ratelimit-remaining", decision.remaining.to_string()),
            ("x-ratelimit-reset", decision.reset.to_string()),
        ],
        Json(json!({ "report": report })),
    )
        .into_response())
}
