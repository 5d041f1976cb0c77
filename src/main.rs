use insight_api::{app, config::AppConfig, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up APPWRITE_* and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Insight API in {:?} mode", config.environment);

    if !config.identity_configured() {
        tracing::warn!("identity provider not configured; authenticated routes will fail");
    }

    let port = config.server.port;
    let state = AppState::new(config);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Insight API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
