//! Outbound calls ignore proxy environment variables
//!
//! Kept in its own test binary: it mutates process-wide environment
//! variables that every reqwest client would otherwise pick up.

use dashproxy::{ProxyForwarder, ServerConfig, Whitelist};
use http_body_util::BodyExt;
use std::sync::Arc;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_forwarder_connects_directly_despite_proxy_env() {
    // A reachable "proxy" that must never see a connection
    let env_proxy = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let env_proxy_url = format!("http://{}", env_proxy.local_addr().unwrap());
    for key in ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
        std::env::set_var(key, &env_proxy_url);
    }
    for key in ["NO_PROXY", "no_proxy"] {
        std::env::remove_var(key);
    }

    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&upstream)
        .await;

    let config = ServerConfig {
        whitelist: Whitelist::new([upstream.uri()]),
        ..ServerConfig::default()
    };
    let forwarder = ProxyForwarder::new(Arc::new(config)).unwrap();

    let response = forwarder
        .forward(Some(&format!("{}/api/v3/ping", upstream.uri())))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], br#"{"ok":true}"#);

    let proxied = tokio::time::timeout(std::time::Duration::from_millis(200), env_proxy.accept()).await;
    assert!(proxied.is_err(), "request was routed through the environment proxy");
}
