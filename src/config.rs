use std::env;
use std::path::PathBuf;

pub const DEFAULT_NEWS_API_URL: &str = "https://gnews.io/api/v4/top-headlines";

/// AppConfig
///
/// Everything the portal server reads from the environment. Loaded once at startup and
/// cloned into request state.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and which variables are mandatory.
    pub env: Env,
    // Address the static/proxy server binds to.
    pub bind_addr: String,
    // Directory holding index.html, views/, js/ and data/.
    pub public_dir: PathBuf,
    // Upstream news endpoint the server proxies to.
    pub news_api_url: String,
    // Upstream news key. Server-side only; never handed to the client.
    pub news_api_key: Option<String>,
}

/// Env
///
/// Runtime context: local development or production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

// The key is a secret and stays out of debug output.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("public_dir", &self.public_dir)
            .field("news_api_url", &self.news_api_url)
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking values for tests: no news key, so the proxy answers 503.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            public_dir: PathBuf::from("public"),
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            news_api_key: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// In production, panics when `NEWS_API_KEY` is missing.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let public_dir =
            PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()));
        let news_api_url =
            env::var("NEWS_API_URL").unwrap_or_else(|_| DEFAULT_NEWS_API_URL.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                bind_addr,
                public_dir,
                news_api_url,
                // Without a key the proxy reports itself unavailable.
                news_api_key: env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty()),
            },
            Env::Production => Self {
                env: Env::Production,
                bind_addr,
                public_dir,
                news_api_url,
                news_api_key: Some(
                    env::var("NEWS_API_KEY").expect("FATAL: NEWS_API_KEY required in prod"),
                ),
            },
        }
    }
}
