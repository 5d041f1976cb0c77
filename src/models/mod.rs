// Response shaping: allow-list projections from raw store documents.
use serde::Serialize;
use serde_json::{json, Value};

use crate::store::document::{bool_field, decode_embedded_json, i64_field, str_field};

/// Public view of a chatbot. Strict allow-list: fields absent from this
/// struct are never forwarded, whatever the underlying record carries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicChatbot {
    pub id: String,
    pub namespace: String,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub domain: String,
    pub industry: String,
    pub created_at: String,
    pub pages_crawled: i64,
    pub documents_stored: i64,
}

impl PublicChatbot {
    pub fn from_document(doc: &Value) -> Self {
        Self {
            id: str_field(doc, "$id"),
            namespace: str_field(doc, "namespace"),
            title: str_field(doc, "title"),
            description: str_field(doc, "description"),
            company_name: str_field(doc, "companyName"),
            domain: str_field(doc, "domain"),
            industry: str_field(doc, "industry"),
            created_at: str_field(doc, "createdAt"),
            pages_crawled: i64_field(doc, "pagesCrawled"),
            documents_stored: i64_field(doc, "documentsStored"),
        }
    }
}

/// Owner's view of a chatbot: the public fields plus publication state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedChatbot {
    #[serde(flatten)]
    pub chatbot: PublicChatbot,
    pub published: bool,
}

impl OwnedChatbot {
    pub fn from_document(doc: &Value) -> Self {
        Self {
            chatbot: PublicChatbot::from_document(doc),
            published: bool_field(doc, "published"),
        }
    }
}

/// One chat message. `sources` and `capabilities` are persisted as JSON
/// strings and decoded defensively: corruption degrades to `[]`, never to a
/// failed request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub chatbot_id: String,
    pub message_id: String,
    pub role: String,
    pub content: String,
    pub sources: Value,
    pub capabilities: Value,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn from_document(doc: &Value) -> Self {
        Self {
            id: str_field(doc, "$id"),
            chatbot_id: str_field(doc, "chatbotId"),
            message_id: str_field(doc, "messageId"),
            role: str_field(doc, "role"),
            content: str_field(doc, "content"),
            sources: decode_embedded_json(doc, "sources", json!([])),
            capabilities: decode_embedded_json(doc, "capabilities", json!([])),
            timestamp: str_field(doc, "timestamp"),
        }
    }
}

/// Authenticated user as returned by `/api/auth/me`: identity fields plus
/// the profile's preferences (defaulting to `{}`).
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub preferences: Value,
}
