// Company research: thin forwarding to the hosted web-search provider.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("research provider is not configured")]
    NotConfigured,

    #[error("research provider request failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchReport {
    pub company: String,
    pub domain: Option<String>,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

pub struct ResearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ResearchClient {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: Option<String>) -> Self {
        Self { http, endpoint, api_key }
    }

    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn research(
        &self,
        company: &str,
        domain: Option<&str>,
    ) -> Result<ResearchReport, ResearchError> {
        let api_key = self.api_key.as_deref().ok_or(ResearchError::NotConfigured)?;

        let query = match domain {
            Some(domain) => format!("{} ({}) company overview products news", company, domain),
            None => format!("{} company overview products news", company),
        };

        let body = json!({
            "api_key": api_key,
            "query": query,
            "search_depth": "advanced",
            "include_answer": true,
            "max_results": 8,
        });

        let response = self
            .http
            .post(format!("{}/search", self.endpoint.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ResearchError::Upstream(format!("status {}: {}", status, text)));
        }

        let search: SearchResponse = response.json().await?;

        let findings: Vec<Finding> = search
            .results
            .into_iter()
            .map(|r| Finding {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect();

        let summary = search
            .answer
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| match findings.first() {
                Some(first) => first.snippet.clone(),
                None => format!("No public information found for {}", company),
            });

        Ok(ResearchReport {
            company: company.to_string(),
            domain: domain.map(str::to_string),
            summary,
            findings,
            generated_at: Utc::now().to_rfc3339(),
        })
    }
}
