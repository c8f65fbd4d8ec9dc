//! Response builders shared by the proxy and static paths

use crate::error::internal_error;
use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode};

pub type HttpResponse = Response<BoxBody<Bytes, hyper::Error>>;

/// Create full body
pub fn full_body(bytes: Bytes) -> BoxBody<Bytes, hyper::Error> {
    Full::new(bytes)
        .map_err(|never| match never {})
        .boxed()
}

/// Create text response
pub fn text_response(status: StatusCode, body: &str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(full_body(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| internal_error())
}

/// Create JSON response
pub fn json_response(status: StatusCode, body: String) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(full_body(Bytes::from(body)))
        .unwrap_or_else(|_| internal_error())
}

/// Create a 200 response carrying file bytes
pub fn file_response(content: Vec<u8>, content_type: &'static str) -> HttpResponse {
    let mut response = Response::new(full_body(Bytes::from(content)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
