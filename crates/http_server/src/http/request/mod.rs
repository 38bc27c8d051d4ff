use std::net::SocketAddr;

use bytes::Bytes;

use crate::http::{
    Body, HttpVersion,
    header::{HeaderMap, HeaderName, HeaderValue},
    method::Method,
};

/// A decoded request, consumed by exactly one handler
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: String,
    pub version: HttpVersion,
    pub headers: HeaderMap,
    pub body: Body,
    pub remote: Option<SocketAddr>,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            version: HttpVersion::HTTP_1_1,
            headers: HeaderMap::new(),
            body: Body::None,
            remote: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(HeaderName::from(name), HeaderValue::from(value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Body::from(body.into());
        self
    }

    /// The raw request target, always starting with `/`
    pub fn path(&self) -> &str {
        &self.target
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }
}
