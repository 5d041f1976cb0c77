use serde::{Deserialize, Serialize};
use std::env;

/// Process-wide configuration, built once at startup and shared read-only
/// through the application state. Business logic never reads the environment
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub search: SearchConfig,
    pub ai: AiConfig,
    pub memory: MemoryConfig,
    pub limits: RateLimitConfig,
    pub features: FeatureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// Identity provider + document store connection (one hosted service covers
/// both). `endpoint` includes the API version prefix, e.g.
/// `https://cloud.appwrite.io/v1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub users_collection: String,
    pub chatbots_collection: String,
    pub messages_collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

/// AI provider keys are only surfaced as capability flags; the research
/// pipeline that consumes them lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub mem0_api_key: Option<String>,
    pub vector_url: Option<String>,
    pub vector_token: Option<String>,
    pub redis_url: Option<String>,
    pub redis_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub research_requests: u32,
    pub research_window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub disable_chatbot_creation: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        Self {
            environment,
            server: ServerConfig { port },
            identity: IdentityConfig {
                endpoint: var_or("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
                project_id: var_or("APPWRITE_PROJECT_ID", ""),
                api_key: var_or("APPWRITE_API_KEY", ""),
                database_id: var_or("APPWRITE_DATABASE_ID", "main"),
                users_collection: var_or("APPWRITE_USERS_COLLECTION_ID", "users"),
                chatbots_collection: var_or("APPWRITE_CHATBOTS_COLLECTION_ID", "chatbots"),
                messages_collection: var_or("APPWRITE_MESSAGES_COLLECTION_ID", "messages"),
            },
            search: SearchConfig {
                endpoint: var_or("TAVILY_ENDPOINT", "https://api.tavily.com"),
                api_key: non_empty_var("TAVILY_API_KEY"),
            },
            ai: AiConfig {
                openai_api_key: non_empty_var("OPENAI_API_KEY"),
                groq_api_key: non_empty_var("GROQ_API_KEY"),
                gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            },
            memory: MemoryConfig {
                mem0_api_key: non_empty_var("MEM0_API_KEY"),
                vector_url: non_empty_var("UPSTASH_VECTOR_REST_URL"),
                vector_token: non_empty_var("UPSTASH_VECTOR_REST_TOKEN"),
                redis_url: non_empty_var("UPSTASH_REDIS_REST_URL"),
                redis_token: non_empty_var("UPSTASH_REDIS_REST_TOKEN"),
            },
            limits: RateLimitConfig {
                research_requests: env::var("RESEARCH_RATE_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                research_window_secs: env::var("RESEARCH_RATE_WINDOW_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(86_400),
            },
            features: FeatureConfig {
                disable_chatbot_creation: env::var("DISABLE_CHATBOT_CREATION")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// True once the identity provider can actually be called.
    pub fn identity_configured(&self) -> bool {
        !self.identity.project_id.is_empty() && !self.identity.api_key.is_empty()
    }

    pub fn search_configured(&self) -> bool {
        self.search.api_key.is_some()
    }

    pub fn cache_configured(&self) -> bool {
        self.memory.redis_url.is_some() && self.memory.redis_token.is_some()
    }

    pub fn vector_configured(&self) -> bool {
        self.memory.vector_url.is_some() && self.memory.vector_token.is_some()
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
