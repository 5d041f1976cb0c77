use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::UserProfile;
use crate::session;
use crate::state::AppState;
use crate::store::document::decode_embedded_json;
use crate::store::Query;

/// GET /api/auth/me
///
/// Identity comes from the resolved session; the profile document is looked
/// up by `accountId` (at most one per account), never by matching document
/// id to identity id. A missing or unreadable profile degrades to empty
/// preferences rather than failing the request.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = session::resolve(&state, &headers).await?;

    let identity = &state.config.identity;
    let preferences = match session
        .store
        .list_documents(
            &identity.database_id,
            &identity.users_collection,
            &[
                Query::equal("accountId", session.identity.id.clone()),
                Query::limit(1),
            ],
        )
        .await
    {
        Ok(list) => list
            .documents
            .first()
            .map(|doc| decode_embedded_json(doc, "preferences", json!({})))
            .unwrap_or_else(|| json!({})),
        Err(err) => {
            tracing::warn!(account_id = %session.identity.id, error = %err,
                "profile lookup failed, returning empty preferences");
            json!({})
        }
    };

    let user = UserProfile {
        id: session.identity.id,
        email: session.identity.email,
        name: session.identity.name,
        preferences,
    };

    Ok(Json(json!({ "user": user })))
}
