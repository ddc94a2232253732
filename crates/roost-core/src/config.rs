//! Endpoint configuration resolution.
//!
//! At startup the client asks its host for runtime endpoints via a
//! `get_config` channel. The channel is optional: absence, errors, and
//! partial documents are all normal, and every missing piece falls back to
//! the compiled-in defaults. Resolution happens once per process; callers
//! read the cached result.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Default request/response API base URL
pub const DEFAULT_CHAT_BASE: &str = "http://localhost:6688/api";
/// Default event stream base URL
pub const DEFAULT_NOTIFICATION_BASE: &str = "http://localhost:6687/events";

/// Raw response of the host `get_config` channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// Server endpoint section
    #[serde(default)]
    pub server: ServerSection,
}

/// The `server` section of a configuration document. Both fields are
/// optional; a missing field falls back to its default on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    /// Request/response API base URL
    #[serde(default)]
    pub chat: Option<String>,
    /// Event stream base URL
    #[serde(default)]
    pub notification: Option<String>,
}

/// Resolved endpoints, immutable after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Base URL for request/response API calls
    pub chat_base: String,
    /// Base URL for the server-push event stream
    pub notification_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            chat_base: DEFAULT_CHAT_BASE.to_string(),
            notification_base: DEFAULT_NOTIFICATION_BASE.to_string(),
        }
    }
}

/// A host-provided configuration channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the raw configuration document.
    async fn fetch(&self) -> Result<ConfigResponse>;
}

/// Configuration channel backed by a JSON file on disk.
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    /// Create a source reading from the given path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<config_dir>/roost/config.json`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roost").join("config.json"))
    }
}

#[async_trait::async_trait]
impl ConfigSource for FileConfigSource {
    async fn fetch(&self) -> Result<ConfigResponse> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Absent configuration channel. Always reports itself unavailable, which
/// resolves everything to defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConfigSource;

#[async_trait::async_trait]
impl ConfigSource for NullConfigSource {
    async fn fetch(&self) -> Result<ConfigResponse> {
        Err(Error::Config("no configuration channel".to_string()))
    }
}

impl EndpointConfig {
    /// Resolve endpoints from the host channel.
    ///
    /// Calls the source exactly once. Failures are logged at warning level
    /// and substituted with defaults, never propagated; a partial response
    /// falls back per field.
    pub async fn resolve(source: &dyn ConfigSource) -> Self {
        let server = match source.fetch().await {
            Ok(response) => response.server,
            Err(e) => {
                warn!(error = %e, "failed to get config: fallback");
                return Self::default();
            }
        };

        Self {
            chat_base: server
                .chat
                .unwrap_or_else(|| DEFAULT_CHAT_BASE.to_string()),
            notification_base: server
                .notification
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_BASE.to_string()),
        }
    }
}

static ENDPOINTS: OnceLock<EndpointConfig> = OnceLock::new();

/// Resolve endpoints once and cache them for the process lifetime.
///
/// A second call is a no-op that returns the already-cached value.
pub async fn init_endpoints(source: &dyn ConfigSource) -> &'static EndpointConfig {
    if let Some(existing) = ENDPOINTS.get() {
        debug!("endpoint configuration already resolved");
        return existing;
    }
    let resolved = EndpointConfig::resolve(source).await;
    ENDPOINTS.get_or_init(|| resolved)
}

/// Read the cached endpoints. Yields the defaults when [`init_endpoints`]
/// was never run.
pub fn endpoints() -> &'static EndpointConfig {
    ENDPOINTS.get_or_init(EndpointConfig::default)
}
