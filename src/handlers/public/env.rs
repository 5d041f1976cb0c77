use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/check-env - capability flags derived from configuration.
/// Reports presence only; never echoes key material.
pub async fn check_env(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;

    Json(json!({
        "identityConfigured": config.identity_configured(),
        "searchConfigured": config.search_configured(),
        "aiProviders": {
            "openai": config.ai.openai_api_key.is_some(),
            "groq": config.ai.groq_api_key.is_some(),
            "gemini": config.ai.gemini_api_key.is_some(),
        },
        "memoryConfigured": config.memory.mem0_api_key.is_some(),
        "vectorConfigured": config.vector_configured(),
        "cacheConfigured": config.cache_configured(),
        "chatbotCreationDisabled": config.features.disable_chatbot_creation,
    }))
}
