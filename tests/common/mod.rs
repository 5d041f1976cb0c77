#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use insight_api::config::{
    AiConfig, AppConfig, Environment, FeatureConfig, IdentityConfig, MemoryConfig,
    RateLimitConfig, SearchConfig, ServerConfig,
};
use insight_api::{app, AppState};

// ---------------------------------------------------------------------------
// Mock upstream: identity provider + document store + KV limiter + search.
// Every handler bumps the call counter so tests can assert that validation
// failures perform zero upstream calls.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MockAccount {
    id: String,
    email: String,
    password: String,
    name: String,
}

#[derive(Default)]
struct BackendInner {
    accounts: Vec<MockAccount>,
    sessions: HashMap<String, String>,
    collections: HashMap<String, Vec<Value>>,
    counters: HashMap<String, u64>,
}

#[derive(Clone)]
pub struct MockBackend {
    pub base_url: String,
    calls: Arc<AtomicUsize>,
    inner: Arc<Mutex<BackendInner>>,
}

#[derive(Clone)]
struct MockState {
    calls: Arc<AtomicUsize>,
    inner: Arc<Mutex<BackendInner>>,
}

impl MockBackend {
    pub async fn spawn() -> Result<Self> {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Arc::new(Mutex::new(BackendInner::default()));
        let state = MockState { calls: calls.clone(), inner: inner.clone() };

        let router = Router::new()
            .route("/v1/account", post(create_account).get(get_account))
            .route("/v1/account/sessions/email", post(create_session))
            .route(
                "/v1/account/sessions/current",
                axum::routing::delete(delete_session),
            )
            .route("/v1/health", get(health))
            .route(
                "/v1/databases/:db/collections/:col/documents",
                get(list_documents).post(create_document),
            )
            .route("/redis/pipeline", post(redis_pipeline))
            .route("/search", post(search))
            .with_state(state);

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock backend");
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            calls,
            inner,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inject a raw document directly, bypassing the HTTP surface.
    pub fn insert_document(&self, collection: &str, mut doc: Value) {
        if doc.get("$id").is_none() {
            doc["$id"] = json!(uuid::Uuid::new_v4().to_string());
        }
        let mut inner = self.inner.lock().unwrap();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    pub fn documents(&self, collection: &str) -> Vec<Value> {
        let inner = self.inner.lock().unwrap();
        inner.collections.get(collection).cloned().unwrap_or_default()
    }

    pub fn account_count(&self) -> usize {
        self.inner.lock().unwrap().accounts.len()
    }
}

fn provider_error(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "message": message, "code": status.as_u16(), "type": kind })),
    )
        .into_response()
}

fn session_account(state: &MockState, headers: &HeaderMap) -> Option<MockAccount> {
    let token = headers.get("x-appwrite-session")?.to_str().ok()?;
    let inner = state.inner.lock().unwrap();
    let account_id = inner.sessions.get(token)?.clone();
    inner.accounts.iter().find(|a| a.id == account_id).cloned()
}

fn has_api_key(headers: &HeaderMap) -> bool {
    headers
        .get("x-appwrite-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

async fn create_account(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let name = body["name"].as_str().unwrap_or_default().to_string();

    let mut inner = state.inner.lock().unwrap();
    if inner.accounts.iter().any(|a| a.email == email) {
        return provider_error(
            StatusCode::CONFLICT,
            "user_already_exists",
            "A user with the same email already exists",
        );
    }

    let account = MockAccount {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.clone(),
        password,
        name: name.clone(),
    };
    let id = account.id.clone();
    inner.accounts.push(account);

    (
        StatusCode::CREATED,
        Json(json!({ "$id": id, "email": email, "name": name })),
    )
        .into_response()
}

async fn get_account(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    match session_account(&state, &headers) {
        Some(account) => Json(json!({
            "$id": account.id, "email": account.email, "name": account.name
        }))
        .into_response(),
        None => provider_error(
            StatusCode::UNAUTHORIZED,
            "general_unauthorized_scope",
            "User (role: guests) missing scope (account)",
        ),
    }
}

async fn create_session(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut inner = state.inner.lock().unwrap();
    let Some(account) = inner.accounts.iter().find(|a| a.email == email).cloned() else {
        return provider_error(
            StatusCode::NOT_FOUND,
            "user_not_found",
            "User with the requested email could not be found",
        );
    };
    if account.password != password {
        return provider_error(
            StatusCode::UNAUTHORIZED,
            "user_invalid_credentials",
            "Invalid credentials",
        );
    }

    let token = uuid::Uuid::new_v4().to_string();
    inner.sessions.insert(token.clone(), account.id.clone());

    (
        StatusCode::CREATED,
        Json(json!({
            "$id": uuid::Uuid::new_v4().to_string(),
            "secret": token,
            "userId": account.id,
        })),
    )
        .into_response()
}

async fn delete_session(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(token) = headers.get("x-appwrite-session").and_then(|v| v.to_str().ok()) {
        state.inner.lock().unwrap().sessions.remove(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn health(State(state): State<MockState>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status": "pass" })).into_response()
}

#[derive(Debug)]
enum ParsedQuery {
    Equal(String, Value),
    OrderAsc(String),
    OrderDesc(String),
    Limit(usize),
}

fn parse_queries(raw: Option<String>) -> Vec<ParsedQuery> {
    let Some(raw) = raw else { return vec![] };
    url::form_urlencoded::parse(raw.as_bytes())
        .filter(|(k, _)| k == "queries[]")
        .filter_map(|(_, v)| serde_json::from_str::<Value>(&v).ok())
        .filter_map(|q| {
            let method = q["method"].as_str()?.to_string();
            match method.as_str() {
                "equal" => Some(ParsedQuery::Equal(
                    q["attribute"].as_str()?.to_string(),
                    q["values"][0].clone(),
                )),
                "orderAsc" => Some(ParsedQuery::OrderAsc(q["attribute"].as_str()?.to_string())),
                "orderDesc" => Some(ParsedQuery::OrderDesc(q["attribute"].as_str()?.to_string())),
                "limit" => Some(ParsedQuery::Limit(q["values"][0].as_u64()? as usize)),
                _ => None,
            }
        })
        .collect()
}

async fn list_documents(
    State(state): State<MockState>,
    Path((_db, col)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    if !has_api_key(&headers) && session_account(&state, &headers).is_none() {
        return provider_error(
            StatusCode::UNAUTHORIZED,
            "general_unauthorized_scope",
            "Missing credentials",
        );
    }

    let queries = parse_queries(raw);
    let mut docs = {
        let inner = state.inner.lock().unwrap();
        inner.collections.get(&col).cloned().unwrap_or_default()
    };

    for q in &queries {
        if let ParsedQuery::Equal(attr, value) = q {
            docs.retain(|d| d.get(attr) == Some(value));
        }
    }
    for q in &queries {
        match q {
            ParsedQuery::OrderAsc(attr) => {
                docs.sort_by_key(|d| d.get(attr).map(|v| v.to_string()).unwrap_or_default());
            }
            ParsedQuery::OrderDesc(attr) => {
                docs.sort_by_key(|d| {
                    std::cmp::Reverse(d.get(attr).map(|v| v.to_string()).unwrap_or_default())
                });
            }
            _ => {}
        }
    }
    for q in &queries {
        if let ParsedQuery::Limit(limit) = q {
            docs.truncate(*limit);
        }
    }

    Json(json!({ "total": docs.len(), "documents": docs })).into_response()
}

async fn create_document(
    State(state): State<MockState>,
    Path((_db, col)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    if !has_api_key(&headers) && session_account(&state, &headers).is_none() {
        return provider_error(
            StatusCode::UNAUTHORIZED,
            "general_unauthorized_scope",
            "Missing credentials",
        );
    }

    let requested_id = body["documentId"].as_str().unwrap_or("unique()");
    let id = if requested_id == "unique()" {
        uuid::Uuid::new_v4().to_string()
    } else {
        requested_id.to_string()
    };

    let mut doc = body["data"].clone();
    doc["$id"] = json!(id);
    doc["$createdAt"] = json!(chrono::Utc::now().to_rfc3339());

    let mut inner = state.inner.lock().unwrap();
    inner.collections.entry(col).or_default().push(doc.clone());

    (StatusCode::CREATED, Json(doc)).into_response()
}

async fn redis_pipeline(
    State(state): State<MockState>,
    Json(commands): Json<Vec<Vec<Value>>>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let mut results = Vec::new();
    let mut inner = state.inner.lock().unwrap();
    for command in &commands {
        let op = command.first().and_then(Value::as_str).unwrap_or_default();
        let key = command.get(1).and_then(Value::as_str).unwrap_or_default();
        let result = match op {
            "INCR" => {
                let counter = inner.counters.entry(key.to_string()).or_insert(0);
                *counter += 1;
                json!(*counter)
            }
            "EXPIRE" => json!(1),
            "TTL" => json!(3600),
            _ => json!(null),
        };
        results.push(json!({ "result": result }));
    }

    Json(json!(results)).into_response()
}

async fn search(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let query = body["query"].as_str().unwrap_or_default();
    Json(json!({
        "answer": format!("Summary for query: {}", query),
        "results": [
            { "title": "Company profile", "url": "https://example.com/profile", "content": "Profile snippet" },
            { "title": "Recent news", "url": "https://example.com/news", "content": "News snippet" },
        ],
    }))
    .into_response()
}

// ---------------------------------------------------------------------------
// Application under test
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub base_url: String,
    pub backend: MockBackend,
    pub client: reqwest::Client,
}

pub fn test_config(backend: &MockBackend) -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port: 0 },
        identity: IdentityConfig {
            endpoint: format!("{}/v1", backend.base_url),
            project_id: "test-project".into(),
            api_key: "test-api-key".into(),
            database_id: "main".into(),
            users_collection: "users".into(),
            chatbots_collection: "chatbots".into(),
            messages_collection: "messages".into(),
        },
        search: SearchConfig {
            endpoint: backend.base_url.clone(),
            api_key: Some("tvly-test".into()),
        },
        ai: AiConfig {
            openai_api_key: Some("sk-test".into()),
            groq_api_key: None,
            gemini_api_key: None,
        },
        memory: MemoryConfig {
            mem0_api_key: None,
            vector_url: None,
            vector_token: None,
            redis_url: Some(format!("{}/redis", backend.base_url)),
            redis_token: Some("redis-test-token".into()),
        },
        limits: RateLimitConfig {
            research_requests: 5,
            research_window_secs: 86_400,
        },
        features: FeatureConfig {
            disable_chatbot_creation: false,
        },
    }
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(tweak: impl FnOnce(&mut AppConfig)) -> Result<TestApp> {
    let backend = MockBackend::spawn().await?;
    let mut config = test_config(&backend);
    tweak(&mut config);

    let state = AppState::new(config);
    let router = app(state);

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test app");
    });

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        backend,
        client: reqwest::Client::new(),
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register an account and return (session token, user id).
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<(String, String)> {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "register failed: {}", res.status());

        let token = session_cookie_value(&res).context("no session cookie set")?;
        let body: Value = res.json().await?;
        let user_id = body["user"]["id"]
            .as_str()
            .context("register response missing user id")?
            .to_string();
        Ok((token, user_id))
    }

    pub fn session_header(&self, token: &str) -> (&'static str, String) {
        ("cookie", format!("appwrite-session={}", token))
    }
}

/// Value of the `appwrite-session` cookie from a response's `Set-Cookie`
/// headers, if one was set (empty string means it was cleared).
pub fn session_cookie_value(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let first = cookie.split(';').next()?;
            let mut parts = first.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some("appwrite-session"), Some(value)) => Some(value.to_string()),
                _ => None,
            }
        })
}

/// True when the response carries a cookie-clearing `Set-Cookie` header.
pub fn clears_session_cookie(res: &reqwest::Response) -> bool {
    res.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|cookie| cookie.starts_with("appwrite-session=;") && cookie.contains("Max-Age=0"))
}
