mod impls;
mod map;
use std::{borrow::Cow, fmt, str::Utf8Error};

use bytes::Bytes;
pub use impls::*;
pub use map::*;
use unicase::UniCase;

/// The name of a header field
///
/// The spelling is kept as received (or as written by a handler), but comparison and hashing
/// ignore ASCII case, so `content-length` and `Content-Length` name the same field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderName(UniCase<Cow<'static, str>>);

impl HeaderName {
    pub fn from_static(name: &'static str) -> Self {
        Self(UniCase::new(Cow::Borrowed(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for HeaderName {
    fn from(value: String) -> Self {
        Self(UniCase::new(Cow::Owned(value)))
    }
}

impl From<&str> for HeaderName {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl TryFrom<Bytes> for HeaderName {
    type Error = Utf8Error;

    fn try_from(value: Bytes) -> Result<Self, Self::Error> {
        Ok(Self::from(std::str::from_utf8(&value)?))
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw value of a header field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderValue(Bytes);

impl HeaderValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.0)
    }
}

impl From<Bytes> for HeaderValue {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<&'static str> for HeaderValue {
    fn from(value: &'static str) -> Self {
        Self(Bytes::from_static(value.as_bytes()))
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self(Bytes::from(value))
    }
}
