use std::fmt::Display;

use bytes::Bytes;
mod builder;
pub use builder::ResponseBuilder;

use crate::http::{
    Body, HttpVersion,
    header::{ContentLength, HeaderMap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: Self = Self(200);
    pub const CREATED: Self = Self(201);
    pub const BAD_REQUEST: Self = Self(400);
    pub const NOT_FOUND: Self = Self(404);
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub const fn canonical_reason(&self) -> Option<&'static str> {
        Some(match self.0 {
            200 => "OK",
            201 => "Created",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Not Allowed",
            500 => "Internal Server Error",
            _ => return None,
        })
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub version: HttpVersion,
    pub status: StatusCode,
    pub message: Bytes,
    pub headers: HeaderMap,
    body: Body,
}

impl Response {
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Replaces the body, keeping `Content-Length` in step with it
    ///
    /// An empty body carries no `Content-Length` at all.
    pub fn set_body(&mut self, bytes: Bytes) {
        if bytes.is_empty() {
            self.headers.remove_header::<ContentLength>();
        } else {
            self.headers.set_header::<ContentLength>(bytes.len() as u64);
        }
        self.body = Body::from(bytes);
    }
}
