use std::fmt::{self, Debug, Display};

use bytes::Bytes;

/// An HTTP Method
///
/// Known methods are kept as builtins, anything else is kept verbatim. The handlers only
/// care about `GET` and `POST`, so no validation happens beyond the token being UTF-8.
#[derive(Clone, PartialEq, Eq)]
pub struct Method(Repr);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMethod;

impl Display for InvalidMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid method")
    }
}

impl std::error::Error for InvalidMethod {}

impl TryFrom<Bytes> for Method {
    type Error = InvalidMethod;

    fn try_from(value: Bytes) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InvalidMethod);
        }
        let s = std::str::from_utf8(&value).map_err(|_| InvalidMethod)?;
        Ok(match Builtin::from_token(s) {
            Some(builtin) => Method(Repr::Builtin(builtin)),
            None => Method(Repr::Custom(value)),
        })
    }
}

impl Method {
    pub const GET: Self = Self(Repr::Builtin(Builtin::GET));
    pub const POST: Self = Self(Repr::Builtin(Builtin::POST));
    pub const PUT: Self = Self(Repr::Builtin(Builtin::PUT));
    pub const DELETE: Self = Self(Repr::Builtin(Builtin::DELETE));
    pub const PATCH: Self = Self(Repr::Builtin(Builtin::PATCH));
    pub const OPTIONS: Self = Self(Repr::Builtin(Builtin::OPTIONS));
    pub const CONNECT: Self = Self(Repr::Builtin(Builtin::CONNECT));
    pub const TRACE: Self = Self(Repr::Builtin(Builtin::TRACE));
    pub const HEAD: Self = Self(Repr::Builtin(Builtin::HEAD));

    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Builtin(builtin) => builtin.as_str(),
            // Checked to be UTF-8 on construction
            Repr::Custom(custom) => std::str::from_utf8(custom).unwrap_or_default(),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Builtin(Builtin),
    Custom(Bytes),
}

// It should be possible for rust to fit the builtin tag into the niche of `Bytes`
static_assertions::assert_eq_size!(Repr, Bytes);

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    CONNECT,
    TRACE,
    HEAD,
}

impl Builtin {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "GET" => Self::GET,
            "POST" => Self::POST,
            "PUT" => Self::PUT,
            "DELETE" => Self::DELETE,
            "PATCH" => Self::PATCH,
            "OPTIONS" => Self::OPTIONS,
            "CONNECT" => Self::CONNECT,
            "TRACE" => Self::TRACE,
            "HEAD" => Self::HEAD,
            _ => return None,
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::DELETE => "DELETE",
            Self::PATCH => "PATCH",
            Self::OPTIONS => "OPTIONS",
            Self::CONNECT => "CONNECT",
            Self::TRACE => "TRACE",
            Self::HEAD => "HEAD",
        }
    }
}
