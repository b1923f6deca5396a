use axum::extract::FromRef;

// --- Module Structure ---

// Value types, errors and configuration.
pub mod config;
pub mod error;
pub mod models;

// Browser-facing seams: tab storage, asset fetching, the document.
pub mod assets;
pub mod dom;
pub mod storage;

// The shell itself.
pub mod app;
pub mod auth;
pub mod bus;
pub mod header;
pub mod pages;
pub mod router;
pub mod routes;
pub mod session;

// Static site and news proxy.
pub mod server;

// --- Public Re-exports ---

pub use app::{App, UiEvent};
pub use assets::{AssetState, HttpAssetClient, MockAssetClient};
pub use config::AppConfig;
pub use dom::{HostState, MemoryPage};
pub use error::ShellError;
pub use server::create_router;
pub use storage::{MemoryTabStorage, TabStorageState};

/// AppState
///
/// Shared state of the HTTP server: the loaded configuration plus one outbound client
/// reused for every proxied news request.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}
