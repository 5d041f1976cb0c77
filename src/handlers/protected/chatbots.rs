use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::OwnedChatbot;
use crate::session;
use crate::state::AppState;
use crate::store::Query;

/// GET /api/chatbots - chatbots owned by the authenticated user, newest
/// first. Scoping is the resolved identity id; client-supplied user ids are
/// never trusted.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = session::resolve(&state, &headers).await?;

    let identity = &state.config.identity;
    let list = session
        .store
        .list_documents(
            &identity.database_id,
            &identity.chatbots_collection,
            &[
                Query::equal("userId", session.identity.id.clone()),
                Query::order_desc("createdAt"),
            ],
        )
        .await?;

    let chatbots: Vec<OwnedChatbot> = list
        .documents
        .iter()
        .map(OwnedChatbot::from_document)
        .collect();

    Ok(Json(json!({ "chatbots": chatbots })))
}
