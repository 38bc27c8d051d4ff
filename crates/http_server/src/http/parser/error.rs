use std::fmt::Display;

use crate::http::response::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    StartLine,
    Headers,
    Body,
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::StartLine => "start line",
            Self::Headers => "headers",
            Self::Body => "body",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    // Syntax/tokenization
    MalformedRequestLine, // not exactly three tokens
    InvalidMethod,
    InvalidTarget, // not origin-form
    MalformedHeaderLine, // no ": " separator
    InvalidHeaderName,   // non-tchar or not UTF-8

    // Flow / I/O
    IncompleteMessage, // ran out before CRLF or before body finished
    Timeout,
    Io(std::io::ErrorKind),
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRequestLine => f.write_str("malformed request line"),
            Self::InvalidMethod => f.write_str("invalid method"),
            Self::InvalidTarget => f.write_str("invalid target"),
            Self::MalformedHeaderLine => f.write_str("malformed header"),
            Self::InvalidHeaderName => f.write_str("invalid header name"),
            Self::IncompleteMessage => f.write_str("incomplete message"),
            Self::Timeout => f.write_str("timed out"),
            Self::Io(err) => Display::fmt(&err, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
    /// Byte offset into the message where the error was noticed
    pub offset: usize,
    /// Line number (1-based) to help logs, when known
    pub line: Option<usize>,
}

impl Display for HttpParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "http parse error: {} while parsing {} at offset {}",
            self.kind, self.location, self.offset
        )?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpParseError {}

impl HttpParseError {
    pub(crate) fn new(kind: ParseErrorKind, location: Location, offset: usize) -> Self {
        Self {
            kind,
            location,
            offset,
            line: None,
        }
    }

    pub(crate) fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub(crate) fn io(err: std::io::Error, location: Location, offset: usize) -> Self {
        Self::new(ParseErrorKind::Io(err.kind()), location, offset)
    }

    /// The peer went away or stalled, there is nobody to answer
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::IncompleteMessage | ParseErrorKind::Timeout | ParseErrorKind::Io(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ParseErrorKind::MalformedRequestLine
            | ParseErrorKind::InvalidMethod
            | ParseErrorKind::InvalidTarget
            | ParseErrorKind::MalformedHeaderLine
            | ParseErrorKind::InvalidHeaderName => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
