use bytes::{Buf, Bytes};
use memchr::{memchr, memmem};
use smallvec::SmallVec;

use crate::http::{
    Body, HttpVersion,
    header::HeaderMap,
    method::Method,
    parser::{HttpParseError, HttpParseResult, Location, ParseErrorKind},
    request::Request,
};

/// One line of the message head, without its terminator
#[derive(Debug, Clone)]
pub struct Line {
    pub(crate) bytes: Bytes,
    /// Offset of the first byte of the line in the message
    pub(crate) offset: usize,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Splits the line on every occurrence of `byte`, keeping empty pieces
    pub fn split_on(&self, byte: u8) -> SmallVec<[Bytes; 3]> {
        let mut pieces = SmallVec::new();
        let mut rest = self.bytes.clone();
        while let Some(ix) = memchr(byte, &rest) {
            pieces.push(rest.split_to(ix));
            rest.advance(1);
        }
        pieces.push(rest);
        pieces
    }

    /// Splits the line around the first occurrence of `sep`
    pub fn split_once(&self, sep: &[u8]) -> Option<(Bytes, Bytes)> {
        let ix = memmem::find(&self.bytes, sep)?;
        Some((
            self.bytes.slice(..ix),
            self.bytes.slice(ix + sep.len()..),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub version: HttpVersion,
}

impl RequestLine {
    // RFC 9112 - 3. Request Line
    // ABNF: request-line = method SP request-target SP HTTP-version
    pub fn parse(line: &Line) -> HttpParseResult<Self> {
        let err = |kind| HttpParseError::new(kind, Location::StartLine, line.offset);

        let words = line.split_on(b' ');
        let [method, target, version] = words.as_slice() else {
            return Err(err(ParseErrorKind::MalformedRequestLine));
        };

        let method =
            Method::try_from(method.clone()).map_err(|_| err(ParseErrorKind::InvalidMethod))?;
        // Only origin-form is served
        let target = std::str::from_utf8(target)
            .ok()
            .filter(|target| target.starts_with('/'))
            .ok_or_else(|| err(ParseErrorKind::InvalidTarget))?
            .to_owned();
        if version.is_empty() {
            return Err(err(ParseErrorKind::MalformedRequestLine));
        }

        Ok(Self {
            method,
            target,
            version: HttpVersion::from_token(version.clone()),
        })
    }

    pub fn into_request(self, headers: HeaderMap, body: Body) -> Request {
        Request {
            method: self.method,
            target: self.target,
            version: self.version,
            headers,
            body,
            remote: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(content: &'static str) -> Line {
        Line {
            bytes: Bytes::from_static(content.as_bytes()),
            offset: 0,
        }
    }

    #[test]
    fn line_split_on() {
        let words = line("this is a  test").split_on(b' ');
        let words: Vec<&[u8]> = words.iter().map(|w| w.as_ref()).collect();
        let expected: [&[u8]; 5] = [b"this", b"is", b"a", b"", b"test"];
        assert_eq!(words, expected);

        assert_eq!(line("").split_on(b' ').len(), 1);
    }

    #[test]
    fn line_split_once() {
        let (name, value) = line("name: value: a").split_once(b": ").unwrap();
        assert_eq!(name, Bytes::from_static(b"name"));
        assert_eq!(value, Bytes::from_static(b"value: a"));

        assert!(line("name:value").split_once(b": ").is_none());
    }

    #[test]
    fn parse_request_line() {
        let cases: &[(&'static str, Result<(Method, &str, &str), ParseErrorKind>)] = &[
            ("GET / HTTP/1.1", Ok((Method::GET, "/", "HTTP/1.1"))),
            (
                "PATCH /login?username=xxx123 HTTP/1.1",
                Ok((Method::PATCH, "/login?username=xxx123", "HTTP/1.1")),
            ),
            ("GET /", Err(ParseErrorKind::MalformedRequestLine)),
            ("", Err(ParseErrorKind::MalformedRequestLine)),
            (
                "PATCH /etc/shadow HTTP/1.1 something else",
                Err(ParseErrorKind::MalformedRequestLine),
            ),
            ("GET  HTTP/1.1", Err(ParseErrorKind::InvalidTarget)),
            ("GET echo HTTP/1.1", Err(ParseErrorKind::InvalidTarget)),
            (" / HTTP/1.1", Err(ParseErrorKind::InvalidMethod)),
            ("GET / ", Err(ParseErrorKind::MalformedRequestLine)),
        ];

        for (data, expected) in cases {
            let parsed = RequestLine::parse(&line(*data));
            match (parsed, expected) {
                (Ok(parsed), Ok((method, target, version))) => {
                    assert_eq!(&parsed.method, method, "{data:?}");
                    assert_eq!(parsed.target, *target, "{data:?}");
                    assert_eq!(parsed.version.to_string(), *version, "{data:?}");
                }
                (Err(err), Err(kind)) => {
                    assert_eq!(&err.kind, kind, "{data:?}");
                    assert_eq!(err.status_code().as_u16(), 400);
                }
                (parsed, expected) => panic!("{data:?}: got {parsed:?}, expected {expected:?}"),
            }
        }
    }
}
