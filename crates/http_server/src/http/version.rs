use std::fmt;

use bytes::Bytes;

/// HTTP Version token, as it appeared on the request line
///
/// The token is not validated beyond being present; responses echo it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpVersion(Bytes);

impl HttpVersion {
    pub const HTTP_1_1: Self = Self(Bytes::from_static(b"HTTP/1.1"));

    pub fn from_token(token: Bytes) -> Self {
        Self(token)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_1_1
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
