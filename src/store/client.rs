use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use super::document::DocumentList;
use super::error::StoreError;
use super::query::Query;
use crate::config::IdentityConfig;

/// Authenticated identity as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Freshly minted session: `secret` is the opaque token the cookie carries.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionToken {
    #[serde(rename = "$id")]
    pub id: String,
    pub secret: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Id policy for document creation.
#[derive(Debug, Clone)]
pub enum DocumentId {
    /// Ask the store to generate an opaque id.
    Unique,
    Custom(String),
}

impl DocumentId {
    fn as_wire(&self) -> String {
        match self {
            DocumentId::Unique => "unique()".to_string(),
            DocumentId::Custom(id) => id.clone(),
        }
    }
}

#[derive(Debug, Clone)]
enum StoreAuth {
    /// Elevated privileges; bypasses per-user access control. Used only for
    /// account management and the public published-only read path.
    ApiKey(String),
    /// Scoped to one resolved session for the remainder of a request.
    Session(String),
}

/// Thin client over the hosted identity provider / document store REST API.
/// One round trip per operation; no retry policy lives in this layer.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    auth: StoreAuth,
}

impl StoreClient {
    pub fn admin(http: reqwest::Client, identity: &IdentityConfig) -> Self {
        Self {
            http,
            endpoint: identity.endpoint.trim_end_matches('/').to_string(),
            project_id: identity.project_id.clone(),
            auth: StoreAuth::ApiKey(identity.api_key.clone()),
        }
    }

    pub fn with_session(http: reqwest::Client, identity: &IdentityConfig, token: &str) -> Self {
        Self {
            http,
            endpoint: identity.endpoint.trim_end_matches('/').to_string(),
            project_id: identity.project_id.clone(),
            auth: StoreAuth::Session(token.to_string()),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        queries: &[Query],
    ) -> Result<Value, StoreError> {
        let url = format!("{}{}", self.endpoint, path);
        let mut request = self
            .http
            .request(method, &url)
            .header("x-appwrite-project", &self.project_id)
            .header("content-type", "application/json");

        request = match &self.auth {
            StoreAuth::ApiKey(key) => request.header("x-appwrite-key", key),
            StoreAuth::Session(token) => request.header("x-appwrite-session", token),
        };

        if !queries.is_empty() {
            let params: Vec<(&str, String)> =
                queries.iter().map(|q| ("queries[]", q.to_wire())).collect();
            request = request.query(&params);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let payload: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            Ok(payload)
        } else {
            Err(StoreError::from_response(status.as_u16(), &payload))
        }
    }

    // Account / session operations

    pub async fn get_account(&self) -> Result<Account, StoreError> {
        let value = self.send(Method::GET, "/account", None, &[]).await?;
        serde_json::from_value(value).map_err(|e| StoreError::Upstream {
            status: 200,
            message: format!("malformed account payload: {}", e),
        })
    }

    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, StoreError> {
        let body = json!({
            "userId": "unique()",
            "email": email,
            "password": password,
            "name": name,
        });
        let value = self.send(Method::POST, "/account", Some(body), &[]).await?;
        serde_json::from_value(value).map_err(|e| StoreError::Upstream {
            status: 200,
            message: format!("malformed account payload: {}", e),
        })
    }

    pub async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, StoreError> {
        let body = json!({ "email": email, "password": password });
        let value = self
            .send(Method::POST, "/account/sessions/email", Some(body), &[])
            .await?;
        serde_json::from_value(value).map_err(|e| StoreError::Upstream {
            status: 200,
            message: format!("malformed session payload: {}", e),
        })
    }

    pub async fn delete_current_session(&self) -> Result<(), StoreError> {
        self.send(Method::DELETE, "/account/sessions/current", None, &[])
            .await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<(), StoreError> {
        self.send(Method::GET, "/health", None, &[]).await?;
        Ok(())
    }

    // Document operations. The client performs no implicit tenant isolation:
    // every caller supplies its own scoping filter.

    pub async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, StoreError> {
        let path = format!(
            "/databases/{}/collections/{}/documents",
            database_id, collection_id
        );
        let value = self.send(Method::GET, &path, None, queries).await?;
        serde_json::from_value(value).map_err(|e| StoreError::Upstream {
            status: 200,
            message: format!("malformed document list payload: {}", e),
        })
    }

    pub async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: DocumentId,
        data: Value,
    ) -> Result<Value, StoreError> {
        let path = format!(
            "/databases/{}/collections/{}/documents",
            database_id, collection_id
        );
        let body = json!({
            "documentId": document_id.as_wire(),
            "data": data,
        });
        self.send(Method::POST, &path, Some(body), &[]).await
    }
}
