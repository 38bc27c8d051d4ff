use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, warn};
use memchr::memchr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    http::{
        Body,
        header::{ContentLength, HeaderField, HeaderMap, HeaderName, HeaderValue},
        request::Request,
        response::Response,
    },
    policy::{HeaderLinePolicy, Policy, ShortBodyPolicy},
};

mod error;
mod line;
pub use error::*;
pub use line::{Line, RequestLine};

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Buffered reader over a single connection, handing out lines and exact-length spans
pub struct Reader<T: AsyncRead + Unpin> {
    inner: T,
    buf: BytesMut,
    /// Bytes handed out so far, used for error offsets
    consumed: usize,
    /// Longest wait for a single read
    timeout: Option<Duration>,
}

impl<READER> Reader<READER>
where
    READER: AsyncRead + Unpin,
{
    const BUF_SIZE: usize = 8192;

    pub fn new(reader: READER) -> Self {
        Self {
            inner: reader,
            buf: BytesMut::with_capacity(Self::BUF_SIZE),
            consumed: 0,
            timeout: None,
        }
    }

    async fn fill(&mut self, want: usize, location: Location) -> HttpParseResult<()> {
        self.buf.reserve(want);
        let read = self.inner.read_buf(&mut self.buf);
        let read = match self.timeout {
            None => read.await,
            Some(timeout) => tokio::time::timeout(timeout, read).await.map_err(|_| {
                HttpParseError::new(
                    ParseErrorKind::Timeout,
                    location,
                    self.consumed + self.buf.len(),
                )
            })?,
        };
        match read {
            Ok(0) => Err(HttpParseError::new(
                ParseErrorKind::IncompleteMessage,
                location,
                self.consumed + self.buf.len(),
            )),
            Ok(_) => Ok(()),
            Err(err) => Err(HttpParseError::io(
                err,
                location,
                self.consumed + self.buf.len(),
            )),
        }
    }

    /// Reads a line, removing the CRLF (or a bare LF) from the end
    pub async fn read_line(&mut self, location: Location) -> HttpParseResult<Line> {
        let mut scanned = 0;
        loop {
            if let Some(nl) = memchr(b'\n', &self.buf[scanned..]) {
                let nl = scanned + nl;
                let mut line = self.buf.split_to(nl + 1);
                line.truncate(nl);
                if line.last() == Some(&b'\r') {
                    line.truncate(nl - 1);
                }

                let offset = self.consumed;
                self.consumed += nl + 1;
                return Ok(Line {
                    bytes: line.freeze(),
                    offset,
                });
            }
            scanned = self.buf.len();
            self.fill(Self::BUF_SIZE, location).await?;
        }
    }

    /// Reads exactly `n` bytes, draining what is already buffered first
    ///
    /// The buffer only grows as data arrives, so a large declared length does not allocate
    /// up front.
    pub async fn read_exact(&mut self, n: usize) -> HttpParseResult<Bytes> {
        while self.buf.len() < n {
            let want = (n - self.buf.len()).min(Self::BUF_SIZE);
            self.fill(want, Location::Body).await?;
        }
        self.consumed += n;
        Ok(self.buf.split_to(n).freeze())
    }
}

/// Where the decoder is, carrying what has been decoded so far
#[derive(Debug)]
enum ParseState {
    RequestLine,
    Headers(RequestLine, HeaderMap),
    Body(RequestLine, HeaderMap),
}

/// An HTTP/1.1 request decoder for exactly one request
pub struct Parser<READER: AsyncRead + Unpin> {
    reader: Reader<READER>,
    policy: Policy,
    lines: usize,
}

pub type HttpParseResult<T> = Result<T, HttpParseError>;

impl<READER> Parser<READER>
where
    READER: AsyncRead + Unpin,
{
    pub fn new(reader: READER) -> Self {
        Self::with_policy(reader, Policy::default())
    }

    pub fn with_policy(reader: READER, policy: Policy) -> Self {
        Self {
            reader: Reader::new(reader),
            policy,
            lines: 0,
        }
    }

    /// Bounds every read from the peer; a stalled peer fails with [`ParseErrorKind::Timeout`]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.reader.timeout = timeout;
        self
    }

    /// Decodes a single request, consuming the parser
    ///
    /// Anything the peer sends after the body is never read.
    pub async fn parse_request(mut self) -> HttpParseResult<Request> {
        // RFC 9112 - 2.1 Message Format
        // ABNF:
        //  HTTP-message = start-line CRLF *( field-line CRLF ) CRLF [ message-body ]
        let mut state = ParseState::RequestLine;
        loop {
            state = match state {
                ParseState::RequestLine => {
                    let line = self.next_line(Location::StartLine).await?;
                    let start = RequestLine::parse(&line).map_err(|e| e.at_line(self.lines))?;
                    ParseState::Headers(start, HeaderMap::new())
                }
                ParseState::Headers(start, mut headers) => {
                    let line = self.next_line(Location::Headers).await?;
                    if line.is_empty() {
                        ParseState::Body(start, headers)
                    } else {
                        self.header_line(&line, &mut headers)?;
                        ParseState::Headers(start, headers)
                    }
                }
                ParseState::Body(start, headers) => {
                    let body = self.body(&headers).await?;
                    return Ok(start.into_request(headers, body));
                }
            };
        }
    }

    async fn next_line(&mut self, location: Location) -> HttpParseResult<Line> {
        let line = self
            .reader
            .read_line(location)
            .await
            .map_err(|e| e.at_line(self.lines + 1))?;
        self.lines += 1;
        Ok(line)
    }

    fn header_line(&self, line: &Line, headers: &mut HeaderMap) -> HttpParseResult<()> {
        match self.parse_header(line) {
            Ok((name, value)) => {
                headers.insert(name, value);
                Ok(())
            }
            Err(err) => match self.policy.header_line {
                HeaderLinePolicy::Skip => {
                    warn!(
                        "skipping header line {}: {}",
                        self.lines,
                        String::from_utf8_lossy(line.as_slice())
                    );
                    Ok(())
                }
                HeaderLinePolicy::Reject => Err(err.at_line(self.lines)),
            },
        }
    }

    // RFC 9112 - 5. Field Syntax
    // ABNF: field-line = field-name ":" OWS field-value OWS
    // Only the `": "` spelling is accepted, and the value is kept as sent. The name must be
    // a token only when header lines are rejected, otherwise any non-empty UTF-8 name is kept.
    fn parse_header(&self, line: &Line) -> HttpParseResult<(HeaderName, HeaderValue)> {
        let (name, value) = line.split_once(b": ").ok_or_else(|| {
            HttpParseError::new(
                ParseErrorKind::MalformedHeaderLine,
                Location::Headers,
                line.offset,
            )
        })?;
        let invalid_name = || {
            HttpParseError::new(
                ParseErrorKind::InvalidHeaderName,
                Location::Headers,
                line.offset,
            )
        };
        let strict = self.policy.header_line == HeaderLinePolicy::Reject;
        if name.is_empty() || (strict && !name.iter().copied().all(is_tchar)) {
            return Err(invalid_name());
        }
        let name = HeaderName::try_from(name).map_err(|_| invalid_name())?;
        Ok((name, HeaderValue::from(value)))
    }

    async fn body(&mut self, headers: &HeaderMap) -> HttpParseResult<Body> {
        let len = match headers.get_header::<ContentLength>() {
            Ok(Some(len)) => len,
            Ok(None) => return Ok(Body::None),
            Err(err) => {
                warn!("ignoring unusable {}: {}", ContentLength::NAME, err);
                return Ok(Body::None);
            }
        };
        let Ok(len) = usize::try_from(len) else {
            warn!("ignoring {} of {} bytes", ContentLength::NAME, len);
            return Ok(Body::None);
        };

        match self.reader.read_exact(len).await {
            Ok(bytes) => Ok(Body::from(bytes)),
            Err(err)
                if err.kind == ParseErrorKind::IncompleteMessage
                    && self.policy.short_body == ShortBodyPolicy::Discard =>
            {
                warn!("discarding short body: {}", err);
                Ok(Body::None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Serialises a response into `buf`
///
/// `Content-Length` is always derived from the body being written, and left out for an empty
/// body. Header order follows the map and is not stable.
pub fn encode_response(response: &Response, buf: &mut BytesMut) {
    let body = response.body().as_bytes();

    buf.put_slice(response.version.as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(response.status.to_string().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(&response.message);
    buf.put_slice(b"\r\n");

    let content_length = ContentLength::name();
    for (name, value) in response.headers.iter() {
        if *name == content_length {
            continue;
        }
        put_header(buf, name.as_str().as_bytes(), value.as_bytes());
    }
    if !body.is_empty() {
        put_header(buf, ContentLength::NAME.as_bytes(), body.len().to_string().as_bytes());
    }
    buf.put_slice(b"\r\n");
    buf.put_slice(body);
}

fn put_header(buf: &mut BytesMut, name: &[u8], value: &[u8]) {
    buf.put_slice(name);
    buf.put_slice(b": ");
    buf.put_slice(value);
    buf.put_slice(b"\r\n");
}

/// Writes responses to a connection
pub struct Sender<WRITER: AsyncWrite + Unpin> {
    writer: WRITER,
    buf: BytesMut,
}

impl<WRITER> Sender<WRITER>
where
    WRITER: AsyncWrite + Unpin,
{
    pub fn new(writer: WRITER) -> Self {
        Self {
            writer,
            buf: BytesMut::with_capacity(8192),
        }
    }

    pub async fn send_response(&mut self, response: &Response) -> std::io::Result<()> {
        encode_response(response, &mut self.buf);
        debug!(
            "sending {} {} ({} bytes)",
            response.status,
            String::from_utf8_lossy(&response.message),
            self.buf.len()
        );
        self.flush().await
    }

    /// Signals end of stream to the peer
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.writer.shutdown().await
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        self.writer.write_all(&self.buf).await?;
        self.buf.clear();
        self.writer.flush().await
    }
}
