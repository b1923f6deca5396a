use portal_shell::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point of the portal server: configuration, logging, then the HTTP server that
/// serves the static site and the news proxy.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // In production a missing NEWS_API_KEY stops startup here.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for the portal and info for tower-http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_shell=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: pretty output for reading in a terminal.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: one JSON object per line for the log collector.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal starting in {:?} mode", config.env);
    if config.news_api_key.is_none() {
        tracing::warn!("NEWS_API_KEY not set, /api/news will answer 503");
    }

    // 4. Unified State Assembly
    // The reqwest client for the news proxy is built once and shared by every request.
    let bind_addr = config.bind_addr.clone();
    let public_dir = config.public_dir.display().to_string();
    let app = create_router(AppState::new(config));

    // 5. Router and Server Startup
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind BIND_ADDR");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Serving {} on {}", public_dir, bind_addr);

    // The long-running Axum server process.
    axum::serve(listener, app)
        .await
        .expect("FATAL: server terminated unexpectedly");
}
