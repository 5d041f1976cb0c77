// External fixed-window rate limiter over the hosted KV store's REST API.
// The counting lives remotely; this layer only inspects the decision.
use chrono::Utc;
use serde_json::{json, Value};

/// Outcome of a limiter check. Quota fields are forwarded to the client in
/// the 429 body and `X-RateLimit-*` headers.
#[derive(Debug, Clone)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset: i64,
}

pub struct RateLimiter {
    http: reqwest::Client,
    url: Option<String>,
    token: Option<String>,
    limit: u32,
    window_secs: u64,
}

impl RateLimiter {
    pub fn new(
        http: reqwest::Client,
        url: Option<String>,
        token: Option<String>,
        limit: u32,
        window_secs: u64,
    ) -> Self {
        Self { http, url, token, limit, window_secs }
    }

    /// Increment the window counter for `key` and decide pass/reject.
    /// An unconfigured or failing limiter fails open.
    pub async fn check(&self, key: &str) -> RateDecision {
        let (Some(url), Some(token)) = (&self.url, &self.token) else {
            return self.pass_through();
        };

        match self.pipeline(url, token, key).await {
            Ok(decision) => decision,
            Err(err) => {
                tracing::warn!(error = %err, "rate limiter unavailable, allowing request");
                self.pass_through()
            }
        }
    }

    async fn pipeline(&self, url: &str, token: &str, key: &str) -> anyhow::Result<RateDecision> {
        let window = self.window_secs.to_string();
        let commands = json!([
            ["INCR", key],
            ["EXPIRE", key, window, "NX"],
            ["TTL", key],
        ]);

        let response = self
            .http
            .post(format!("{}/pipeline", url.trim_end_matches('/')))
            .bearer_auth(token)
            .json(&commands)
            .send()
            .await?
            .error_for_status()?;

        let results: Vec<Value> = response.json().await?;
        let count = results
            .first()
            .and_then(|r| r.get("result"))
            .and_then(Value::as_u64)
            .ok_or_else(|| anyhow::anyhow!("malformed INCR reply"))?;
        let ttl = results
            .get(2)
            .and_then(|r| r.get("result"))
            .and_then(Value::as_i64)
            .unwrap_or(self.window_secs as i64);

        let reset = Utc::now().timestamp() + ttl.max(0);
        Ok(RateDecision {
            allowed: count <= self.limit as u64,
            limit: self.limit,
            remaining: (self.limit as u64).saturating_sub(count) as u32,
            reset,
        })
    }

    fn pass_through(&self) -> RateDecision {
        RateDecision {
            allowed: true,
            limit: self.limit,
            remaining: self.limit,
            reset: Utc::now().timestamp() + self.window_secs as i64,
        }
    }
}
