//! Process-wide client configuration.
//!
//! # Design
//! A `ClientConfig` is assembled once at startup and shared by every call the
//! gateway makes. The bearer token is read from a `KeyValueStore` under
//! [`TOKEN_KEY`] exactly once, when the config is built; there is no refresh.
//! Nothing here touches the network.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;

/// Key under which the session token is persisted.
pub const TOKEN_KEY: &str = "JWT";

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";

/// Persistent client-side key/value storage holding the credential.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory store, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A flat JSON object on disk: `{"JWT": "..."}`.
///
/// Non-string values are ignored. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let store_error = |message: String| ConfigError::Store {
            path: path.display().to_string(),
            message,
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "credential store missing, starting empty");
                return Ok(Self {
                    path,
                    values: HashMap::new(),
                });
            }
            Err(e) => return Err(store_error(e.to_string())),
        };

        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&raw).map_err(|e| store_error(e.to_string()))?;
        let values = object
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect();
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Settings applied to every outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    token: Option<String>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            headers: vec![("accept".to_string(), "application/json".to_string())],
            timeout: None,
        }
    }

    /// Build the process configuration from the environment.
    ///
    /// Reads `BASE_URL` (default [`DEFAULT_BASE_URL`]) and the optional
    /// `MAILER_TIMEOUT_SECS`, after loading a `.env` file when one exists.
    /// The token is taken from `store` under [`TOKEN_KEY`].
    pub fn from_env(store: &dyn KeyValueStore) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), store)
    }

    /// Same as [`from_env`](Self::from_env), with variables resolved by
    /// `lookup` instead of the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        store: &dyn KeyValueStore,
    ) -> Result<Self, ConfigError> {
        let base_url = lookup("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url).with_token_from(store);

        if let Some(raw) = lookup("MAILER_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "MAILER_TIMEOUT_SECS".to_string(),
                    message: e.to_string(),
                }
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        debug!(
            base_url = %config.base_url,
            authenticated = config.token.is_some(),
            "client config loaded"
        );
        Ok(config)
    }

    pub fn with_token_from(mut self, store: &dyn KeyValueStore) -> Self {
        self.token = store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute URL for `path`. Paths that already carry a scheme are used
    /// as-is; everything else is joined to the base with a single `/`.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The fixed headers sent with every request.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();
        if let Some(token) = &self.token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}
