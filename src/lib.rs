use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ratelimit;
pub mod research;
pub mod session;
pub mod state;
pub mod store;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Auth
        .merge(auth_routes())
        // Authenticated data
        .merge(chat_routes())
        // Public read path + capability flags
        .merge(public_routes())
        // Research
        .route("/api/company-research", post(handlers::research::company_research))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::{protected, public};

    Router::new()
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/login", post(public::auth::login))
        // GET logout exists purely for link-based logout
        .route(
            "/api/auth/logout",
            post(public::auth::logout).get(public::auth::logout),
        )
        .route("/api/auth/me", get(protected::auth::me))
}

fn chat_routes() -> Router<AppState> {
    use handlers::protected::{chatbots, history};

    Router::new()
        .route("/api/chatbots", get(chatbots::list))
        .route("/api/chat/history", get(history::list).post(history::save))
        .route("/api/chat/history/:id", get(history::list_for_chatbot))
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/api/public/chatbots/:id", get(public::chatbots::get))
        .route("/api/check-env", get(public::env::check_env))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Insight API",
        "version": version,
        "description": "Chatbot platform backend API built with Rust (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/api/auth/register|login|logout|me",
            "chatbots": "/api/chatbots (session)",
            "history": "/api/chat/history[/:id] (session)",
            "public": "/api/public/chatbots/:id (public)",
            "env": "/api/check-env (public)",
            "research": "/api/company-research (rate limited)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    if !state.config.identity_configured() {
        return (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "identity": "unconfigured"
            })),
        );
    }

    match state.admin_store().health().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "identity": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "identity_error": e.to_string()
            })),
        ),
    }
}
