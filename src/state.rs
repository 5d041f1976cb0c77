use std::sync::Arc;

use crate::config::AppConfig;
use crate::ratelimit::RateLimiter;
use crate::research::ResearchClient;
use crate::store::StoreClient;

/// Shared application state: immutable configuration plus one reqwest client
/// reused (cheaply cloned) by every upstream accessor. No mutable state is
/// shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Elevated-privilege client; account management and the public
    /// published-only read path only.
    pub fn admin_store(&self) -> StoreClient {
        StoreClient::admin(self.http.clone(), &self.config.identity)
    }

    /// Per-request client bound to one resolved session token.
    pub fn session_store(&self, token: &str) -> StoreClient {
        StoreClient::with_session(self.http.clone(), &self.config.identity, token)
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            self.http.clone(),
            self.config.memory.redis_url.clone(),
            self.config.memory.redis_token.clone(),
            self.config.limits.research_requests,
            self.config.limits.research_window_secs,
        )
    }

    pub fn research_client(&self) -> ResearchClient {
        ResearchClient::new(
            self.http.clone(),
            self.config.search.endpoint.clone(),
            self.config.search.api_key.clone(),
        )
    }
}
