use std::{fmt, num::ParseIntError, str::Utf8Error};

use crate::http::header::HeaderName;

use super::HeaderValue;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderParseError {
    #[error(transparent)]
    InvalidInt(#[from] ParseIntError),
    #[error(transparent)]
    InvalidUtf8(#[from] Utf8Error),
    #[error("unknown content coding `{0}`")]
    UnknownCoding(String),
}

pub trait HeaderField {
    const NAME: &'static str;
    type Output: HeaderValueTrait;

    fn name() -> HeaderName {
        HeaderName::from_static(Self::NAME)
    }

    fn parse(value: &HeaderValue) -> Result<Self::Output, HeaderParseError> {
        Self::Output::from_header_value(value)
    }
}

pub trait HeaderValueTrait: Sized {
    fn from_header_value(value: &HeaderValue) -> Result<Self, HeaderParseError>;
    fn to_header_value(self) -> HeaderValue;
}

macro_rules! header_struct {
    ($name: ident, $matcher: expr, $ty: ty) => {
        pub struct $name;

        impl HeaderField for $name {
            const NAME: &'static str = $matcher;
            type Output = $ty;
        }
    };
}

impl HeaderValueTrait for u64 {
    fn from_header_value(value: &HeaderValue) -> Result<Self, HeaderParseError> {
        Ok(value.to_str()?.trim_ascii().parse()?)
    }

    fn to_header_value(self) -> HeaderValue {
        HeaderValue::from(self.to_string())
    }
}

impl HeaderValueTrait for String {
    fn from_header_value(value: &HeaderValue) -> Result<Self, HeaderParseError> {
        Ok(value.to_str()?.to_owned())
    }

    fn to_header_value(self) -> HeaderValue {
        HeaderValue::from(self)
    }
}

/// A content coding the server knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Identity,
    Gzip,
}

impl ContentCoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
        }
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HeaderValueTrait for ContentCoding {
    fn from_header_value(value: &HeaderValue) -> Result<Self, HeaderParseError> {
        let s = value.to_str()?.trim_ascii();
        if s.eq_ignore_ascii_case("gzip") || s.eq_ignore_ascii_case("x-gzip") {
            Ok(Self::Gzip)
        } else if s.eq_ignore_ascii_case("identity") {
            Ok(Self::Identity)
        } else {
            Err(HeaderParseError::UnknownCoding(s.to_owned()))
        }
    }

    fn to_header_value(self) -> HeaderValue {
        HeaderValue::from(self.as_str())
    }
}

header_struct!(ContentLength, "Content-Length", u64);
header_struct!(ContentType, "Content-Type", String);
header_struct!(ContentEncoding, "Content-Encoding", ContentCoding);
header_struct!(AcceptEncoding, "Accept-Encoding", String);
header_struct!(UserAgent, "User-Agent", String);
