//! Dashproxy - local development server for a JSON dashboard
//!
//! Provides:
//! - Static file serving from a sandboxed root directory
//! - `/api/proxy?url=` forwarding to a fixed whitelist of upstream JSON APIs
//! - Permissive CORS and short public caching on proxied responses
//! - A hard upstream deadline with no retries

pub mod config;
pub mod error;
pub mod mime;
pub mod proxy;
pub mod response;
pub mod server;
pub mod static_files;
pub mod whitelist;

pub use config::ServerConfig;
pub use error::{ProxyError, StaticError};
pub use proxy::ProxyForwarder;
pub use server::{dispatch, DevServer, Route};
pub use static_files::StaticResponder;
pub use whitelist::Whitelist;
