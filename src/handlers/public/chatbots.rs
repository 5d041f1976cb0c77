// Public read path: unauthenticated chatbot lookup by namespace.
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::PublicChatbot;
use crate::state::AppState;
use crate::store::Query;

/// GET /api/public/chatbots/:id
///
/// `:id` is the public namespace slug, not the internal document id. Uses
/// the admin client because no caller identity exists, restricted to
/// published records. "Not found" and "not published" collapse into the
/// same 404 so unpublished bots are not discoverable.
pub async fn get(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let namespace = namespace.trim();
    if namespace.is_empty() {
        return Err(ApiError::bad_request("Chatbot id is required"));
    }

    let identity = &state.config.identity;
    let list = state
        .admin_store()
        .list_documents(
            &identity.database_id,
            &identity.chatbots_collection,
            &[
                Query::equal("namespace", namespace),
                Query::equal("published", true),
                Query::limit(1),
            ],
        )
        .await?;

    let Some(doc) = list.documents.first() else {
        return Err(ApiError::not_found("Chatbot not found"));
    };

    Ok(Json(json!({ "chatbot": PublicChatbot::from_document(doc) })))
}
