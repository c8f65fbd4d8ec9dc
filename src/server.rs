//! HTTP listener and request dispatcher
//! Routes `/api/proxy` to the proxy forwarder and everything else to the static responder

use crate::config::{ServerConfig, DEFAULT_DOCUMENT, PROXY_ENDPOINT};
use crate::proxy::ProxyForwarder;
use crate::response::HttpResponse;
use crate::static_files::StaticResponder;
use anyhow::{anyhow, bail, Context, Result};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::form_urlencoded;

/// How long in-flight connections get to finish after shutdown is requested
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Where a request goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Proxy { url: Option<String> },
    Static { path: String },
}

/// Pick the handler for a request from its path and query
pub fn dispatch<T>(req: &Request<T>) -> Route {
    let path = req.uri().path();

    if path == PROXY_ENDPOINT {
        let url = req.uri().query().and_then(|q| {
            form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        });
        return Route::Proxy { url };
    }

    if path == "/" {
        return Route::Static { path: format!("/{DEFAULT_DOCUMENT}") };
    }

    Route::Static { path: path.to_string() }
}

/// Dev server: one listener, two route classes
pub struct DevServer {
    config: Arc<ServerConfig>,
    proxy: ProxyForwarder,
    statics: StaticResponder,
}

impl DevServer {
    /// Create a new dev server
    pub fn new(config: Arc<ServerConfig>) -> Result<Self> {
        if !config.static_root.is_absolute() {
            bail!("Static root must be absolute: {}", config.static_root.display());
        }
        let proxy = ProxyForwarder::new(config.clone())?;
        let statics = StaticResponder::new(config.static_root.clone());
        Ok(Self { config, proxy, statics })
    }

    /// Serve until the process exits
    pub async fn run(self: Arc<Self>) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then stop accepting and drain connections
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!("Serving {} on http://{}", self.config.static_root.display(), addr);
        info!("Proxy endpoint: http://{}{}?url=<target>", addr, PROXY_ENDPOINT);
        for entry in self.config.whitelist.entries() {
            debug!("Whitelisted upstream: {}", entry);
        }

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(a) => a,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let server = self.clone();
                    connections.spawn(async move {
                        if let Err(e) = server.handle_connection(stream, remote_addr).await {
                            debug!("HTTP connection error from {}: {}", remote_addr, e);
                        }
                    });
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                () = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);
        let drain = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            warn!("Dropping {} connection(s) still open after grace period", connections.len());
            connections.shutdown().await;
        }

        Ok(())
    }

    /// Handle a single HTTP connection
    async fn handle_connection(self: Arc<Self>, stream: TcpStream, remote_addr: SocketAddr) -> Result<()> {
        let io = TokioIo::new(stream);

        http1::Builder::new()
            .serve_connection(
                io,
                service_fn(move |req| {
                    let server = self.clone();
                    async move { server.handle_request(req, remote_addr).await }
                }),
            )
            .await
            .map_err(|e| anyhow!("HTTP service error: {}", e))
    }

    /// Handle incoming request
    async fn handle_request(
        &self,
        req: Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Result<HttpResponse, Infallible> {
        debug!("{} {} from {}", req.method(), req.uri(), remote_addr);

        let response = match dispatch(&req) {
            Route::Proxy { url } => self.proxy.forward(url.as_deref()).await,
            Route::Static { path } => self.statics.serve(&path).await,
        };

        Ok(response)
    }
}
