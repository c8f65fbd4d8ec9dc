//! Proxy forwarder
//! Relays whitelisted GET requests to upstream JSON APIs with CORS and cache headers

use crate::config::ServerConfig;
use crate::error::{internal_error, ProxyError};
use crate::response::{full_body, HttpResponse};
use anyhow::{Context, Result};
use bytes::Bytes;
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Proxy forwarder
pub struct ProxyForwarder {
    client: reqwest::Client,
    config: Arc<ServerConfig>,
}

impl ProxyForwarder {
    /// Create a new forwarder. Idle connections are not kept, so every
    /// proxied call opens and closes its own upstream connection.
    /// Redirects are relayed as-is rather than followed, and environment
    /// proxy settings are ignored: the only host contacted is the one the
    /// whitelist approved.
    pub fn new(config: Arc<ServerConfig>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self { client, config })
    }

    /// Forward one inbound request. Always produces the final response.
    pub async fn forward(&self, target: Option<&str>) -> HttpResponse {
        match self.try_forward(target).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    async fn try_forward(&self, target: Option<&str>) -> Result<HttpResponse, ProxyError> {
        let target = target
            .filter(|t| !t.is_empty())
            .ok_or(ProxyError::MissingUrl)?;

        // Must hold before any network activity
        if !self.config.whitelist.allows(target) {
            warn!("Rejected non-whitelisted proxy target: {}", target);
            return Err(ProxyError::NotWhitelisted { url: target.to_string() });
        }

        debug!("Proxying to: {}", target);

        // Dropping the fetch future on deadline closes the upstream socket
        let (status, body) = match timeout(self.config.upstream_timeout, self.fetch(target)).await {
            Ok(result) => result?,
            Err(_) => {
                error!(
                    "Upstream timeout after {}ms: {}",
                    self.config.upstream_timeout.as_millis(),
                    target
                );
                return Err(ProxyError::UpstreamTimeout);
            }
        };

        info!("Proxied {} -> {} ({} bytes)", target, status, body.len());

        Ok(self.relay(status, body))
    }

    /// Single GET, body buffered in full
    async fn fetch(&self, target: &str) -> Result<(StatusCode, Bytes), ProxyError> {
        let response = self.client.get(target).send().await.map_err(|e| {
            error!("Proxy request to {} failed: {}", target, e);
            ProxyError::Upstream(e.to_string())
        })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read upstream body from {}: {}", target, e);
            ProxyError::Upstream(e.to_string())
        })?;

        Ok((status, body))
    }

    fn relay(&self, status: StatusCode, body: Bytes) -> HttpResponse {
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(CACHE_CONTROL, self.config.cache_control())
            .body(full_body(body))
            .unwrap_or_else(|_| internal_error())
    }
}
