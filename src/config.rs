//! Server configuration
//! Built once at startup and shared read-only with every request handler

use crate::static_files::normalize_path;
use crate::whitelist::Whitelist;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DOCUMENT: &str = "index.html";
pub const PROXY_ENDPOINT: &str = "/api/proxy";
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const CACHE_MAX_AGE_SECS: u32 = 30;
pub const USER_AGENT: &str = concat!("dashproxy/", env!("CARGO_PKG_VERSION"));

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Absolute, lexically normalized sandbox root for static files
    pub static_root: PathBuf,
    pub whitelist: Whitelist,
    pub upstream_timeout: Duration,
    pub cache_max_age: u32,
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_root: std::env::current_dir().unwrap_or_default(),
            whitelist: Whitelist::default(),
            upstream_timeout: UPSTREAM_TIMEOUT,
            cache_max_age: CACHE_MAX_AGE_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Set the static root, resolving it against the working directory when relative
    pub fn with_static_root<P: AsRef<Path>>(mut self, root: P) -> Result<Self> {
        let root = root.as_ref();
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to read current directory")?
                .join(root)
        };
        self.static_root = normalize_path(&absolute);
        Ok(self)
    }

    /// `Cache-Control` value attached to relayed upstream responses
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }
}
