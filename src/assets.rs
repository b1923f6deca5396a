use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::ShellError;

/// AssetClient
///
/// Defines the contract for fetching same-origin resources as text: page fragments,
/// the header/footer components and the JSON data documents. Fragments are trusted and
/// injected verbatim, so the client performs no sanitization.
///
/// A non-success status and a transport failure are both reported as errors; the caller
/// decides whether that means "not found" (fragments) or "placeholder" (data).
#[async_trait]
pub trait AssetClient: Send + Sync {
    async fn fetch_text(&self, resource: &str) -> Result<String, ShellError>;
}

/// fetch_json
///
/// Fetches `resource` and decodes it as JSON into `T`.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &dyn AssetClient,
    resource: &str,
) -> Result<T, ShellError> {
    let body = client.fetch_text(resource).await?;
    serde_json::from_str(&body).map_err(|e| ShellError::Decode {
        resource: resource.to_string(),
        message: e.to_string(),
    })
}

/// HttpAssetClient
///
/// reqwest-backed client resolving resources against the site's base URL.
#[derive(Clone)]
pub struct HttpAssetClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a resource path (`views/pages/home.html`, `./views/...`, `/data/...`)
    /// against the base URL.
    pub fn url_for(&self, resource: &str) -> String {
        let relative = resource.trim_start_matches("./").trim_start_matches('/');
        format!("{}/{}", self.base_url, relative)
    }
}

#[async_trait]
impl AssetClient for HttpAssetClient {
    async fn fetch_text(&self, resource: &str) -> Result<String, ShellError> {
        let url = self.url_for(resource);
        tracing::debug!(%url, "fetching asset");

        let network = |e: reqwest::Error| ShellError::Network {
            resource: resource.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShellError::HttpStatus {
                resource: resource.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(network)
    }
}

// --- Mock Implementation (headless runs and tests) ---

#[derive(Clone)]
enum MockResponse {
    Body(String),
    Status(u16),
    Unreachable,
    Delayed(Duration, String),
}

/// MockAssetClient
///
/// Scripted responses keyed by resource path. Unknown resources answer 404.
/// Every request is recorded in order so tests can assert what was fetched.
#[derive(Default)]
pub struct MockAssetClient {
    responses: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockAssetClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, resource: &str, body: &str) -> Self {
        self.set(resource, MockResponse::Body(body.to_string()));
        self
    }

    pub fn with_status(self, resource: &str, status: u16) -> Self {
        self.set(resource, MockResponse::Status(status));
        self
    }

    pub fn with_network_failure(self, resource: &str) -> Self {
        self.set(resource, MockResponse::Unreachable);
        self
    }

    /// The body is returned only after `delay` has elapsed on the tokio clock.
    pub fn with_delayed_text(self, resource: &str, delay: Duration, body: &str) -> Self {
        self.set(resource, MockResponse::Delayed(delay, body.to_string()));
        self
    }

    /// Replaces a scripted response after construction.
    pub fn set_text(&self, resource: &str, body: &str) {
        self.set(resource, MockResponse::Body(body.to_string()));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self, resource: &str) -> usize {
        self.requests().iter().filter(|r| *r == resource).count()
    }

    fn set(&self, resource: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.to_string(), response);
    }
}

#[async_trait]
impl AssetClient for MockAssetClient {
    async fn fetch_text(&self, resource: &str) -> Result<String, ShellError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(resource.to_string());

        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .cloned();

        match response {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            Some(MockResponse::Status(status)) => Err(ShellError::HttpStatus {
                resource: resource.to_string(),
                status,
            }),
            Some(MockResponse::Unreachable) => Err(ShellError::Network {
                resource: resource.to_string(),
                message: "Mock network error: simulation requested".to_string(),
            }),
            None => Err(ShellError::HttpStatus {
                resource: resource.to_string(),
                status: 404,
            }),
        }
    }
}

/// AssetState
///
/// The concrete type used to share the asset client across the shell.
pub type AssetState = Arc<dyn AssetClient>;
