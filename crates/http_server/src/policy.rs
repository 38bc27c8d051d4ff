//! Decisions about how forgiving the server is with imperfect input and failed writes
//!
//! The lenient variants are the defaults. [`Policy::strict`] tightens every decision at once,
//! without touching the decoder or the handlers.

/// What to do with a header line that has no `": "` separator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderLinePolicy {
    /// Log and drop the line, keep decoding
    #[default]
    Skip,
    /// Fail the request with 400
    Reject,
}

/// What to do when the peer closes before sending `Content-Length` bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShortBodyPolicy {
    /// Treat the body as absent
    #[default]
    Discard,
    /// Close the connection without answering
    Reject,
}

/// What a `POST /files/{name}` reports when the write fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteFailurePolicy {
    /// Answer 200 OK anyway
    #[default]
    ReportOk,
    /// Answer 500 Internal Server Error
    ReportError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub header_line: HeaderLinePolicy,
    pub short_body: ShortBodyPolicy,
    pub write_failure: WriteFailurePolicy,
}

impl Policy {
    pub const fn lenient() -> Self {
        Self {
            header_line: HeaderLinePolicy::Skip,
            short_body: ShortBodyPolicy::Discard,
            write_failure: WriteFailurePolicy::ReportOk,
        }
    }

    pub const fn strict() -> Self {
        Self {
            header_line: HeaderLinePolicy::Reject,
            short_body: ShortBodyPolicy::Reject,
            write_failure: WriteFailurePolicy::ReportError,
        }
    }
}
