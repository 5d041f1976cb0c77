// Chat history: append-only message documents scoped to one
// (chatbot, user) pair. Messages are created once and never mutated.
use axum::{
    extract::{Path, Query as UrlQuery, State},
    http::HeaderMap,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::ChatMessage;
use crate::session::{self, Session};
use crate::state::AppState;
use crate::store::{DocumentId, Query};

const HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "chatbotId")]
    pub chatbot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMessageRequest {
    pub chatbot_id: Option<String>,
    pub message_id: Option<String>,
    pub role: Option<String>,
    pub content: Option<String>,
    pub sources: Option<Value>,
    pub capabilities: Option<Value>,
    pub timestamp: Option<String>,
}

/// GET /api/chat/history?chatbotId=...
pub async fn list(
    State(state): State<AppState>,
    UrlQuery(query): UrlQuery<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    // Validation precedes any I/O, including session resolution
    let chatbot_id = query
        .chatbot_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("chatbotId is required"))?
        .to_string();

    let session = session::resolve(&state, &headers).await?;
    fetch_history(&state, &session, &chatbot_id).await
}

/// GET /api/chat/history/:id - same listing, chatbot id in the path.
pub async fn list_for_chatbot(
    State(state): State<AppState>,
    Path(chatbot_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let chatbot_id = chatbot_id.trim().to_string();
    if chatbot_id.is_empty() {
        return Err(ApiError::bad_request("chatbotId is required"));
    }

    let session = session::resolve(&state, &headers).await?;
    fetch_history(&state, &session, &chatbot_id).await
}

async fn fetch_history(
    state: &AppState,
    session: &Session,
    chatbot_id: &str,
) -> Result<Json<Value>, ApiError> {
    let identity = &state.config.identity;
    let list = session
        .store
        .list_documents(
            &identity.database_id,
            &identity.messages_collection,
            &[
                Query::equal("chatbotId", chatbot_id),
                Query::equal("userId", session.identity.id.clone()),
                Query::order_asc("timestamp"),
                Query::limit(HISTORY_LIMIT),
            ],
        )
        .await?;

    let messages: Vec<ChatMessage> = list
        .documents
        .iter()
        .map(ChatMessage::from_document)
        .collect();

    Ok(Json(json!({ "messages": messages })))
}

/// POST /api/chat/history
pub async fn save(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SaveMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let chatbot_id = payload
        .chatbot_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("chatbotId is required"))?
        .to_string();
    let role = payload
        .role
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("role is required"))?;
    if role != "user" && role != "assistant" {
        return Err(ApiError::bad_request("role must be 'user' or 'assistant'"));
    }
    let content = payload
        .content
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("content is required"))?;

    let session = session::resolve(&state, &headers).await?;

    let message_id = payload
        .message_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let now = Utc::now().to_rfc3339();
    let timestamp = payload
        .timestamp
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| now.clone());

    // Nested structures are persisted as JSON strings; the store has no
    // nested-document type
    let sources = payload.sources.unwrap_or_else(|| json!([]));
    let capabilities = payload.capabilities.unwrap_or_else(|| json!([]));

    let data = json!({
        "chatbotId": chatbot_id,
        "userId": session.identity.id,
        "messageId": message_id,
        "role": role,
        "content": content,
        "sources": sources.to_string(),
        "capabilities": capabilities.to_string(),
        "timestamp": timestamp,
        "createdAt": now,
    });

    let identity = &state.config.identity;
    let doc = session
        .store
        .create_document(
            &identity.database_id,
            &identity.messages_collection,
            DocumentId::Unique,
            data,
        )
        .await?;

    Ok(Json(json!({ "message": ChatMessage::from_document(&doc) })))
}
