//! Error types for the two request paths
//!
//! Proxy failures answer with JSON bodies, static failures with plain text.
//! Both are terminal: each variant converts straight into the HTTP response
//! that ends the exchange.

use crate::response::{full_body, json_response, text_response, HttpResponse};
use hyper::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Failures on the `/api/proxy` path
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing ?url= parameter")]
    MissingUrl,

    #[error("URL not in whitelist: {url}")]
    NotWhitelisted { url: String },

    #[error("Upstream timeout")]
    UpstreamTimeout,

    #[error("Proxy failed: {0}")]
    Upstream(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingUrl => StatusCode::BAD_REQUEST,
            Self::NotWhitelisted { .. } => StatusCode::FORBIDDEN,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// JSON body sent to the caller
    pub fn body(&self) -> String {
        let body = match self {
            Self::MissingUrl => ErrorBody { error: "Missing ?url= parameter", message: None },
            Self::NotWhitelisted { .. } => ErrorBody { error: "URL not in whitelist", message: None },
            Self::UpstreamTimeout => ErrorBody { error: "Upstream timeout", message: None },
            Self::Upstream(detail) => ErrorBody { error: "Proxy failed", message: Some(detail) },
        };
        serde_json::to_string(&body).unwrap_or_else(|_| String::from("{}"))
    }

    pub fn into_response(self) -> HttpResponse {
        json_response(self.status(), self.body())
    }
}

/// Failures on the static file path
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StaticError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,
}

impl StaticError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        text_response(self.status(), &self.to_string())
    }
}

/// Last-resort response when a response builder itself fails
pub(crate) fn internal_error() -> HttpResponse {
    let mut response = HttpResponse::new(full_body(bytes::Bytes::from_static(b"Internal Server Error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
