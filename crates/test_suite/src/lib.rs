//! Helpers shared by the skiff tests: a raw TCP client, a response splitter, a gzip decoder and
//! an async reader that trickles its data in to exercise incremental parsing.

use std::{
    collections::HashMap,
    io::Read,
    net::SocketAddr,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use bytes::Bytes;
use flate2::read::GzDecoder;
use memchr::memmem;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt, ReadBuf},
    net::TcpStream,
    sync::mpsc,
    time::sleep,
};

/// An [`AsyncRead`] fed from a background task, one chunk at a time
pub struct TrickleReader {
    rx: mpsc::Receiver<Bytes>,
    pending: Bytes,
}

impl TrickleReader {
    /// Sends each chunk after `delay`; the stream ends after the last one
    pub fn from_chunks<I, C>(chunks: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let chunks: Vec<Bytes> = chunks
            .into_iter()
            .map(|c| Bytes::copy_from_slice(c.as_ref()))
            .collect();
        let (tx, rx) = mpsc::channel(chunks.len().max(1));

        tokio::spawn(async move {
            for chunk in chunks {
                sleep(delay).await;
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });
        Self {
            rx,
            pending: Bytes::new(),
        }
    }

    /// Sends `data` one byte at a time
    pub fn bytewise(data: &[u8]) -> Self {
        Self::from_chunks(data.chunks(1), Duration::from_millis(1))
    }
}

impl AsyncRead for TrickleReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        while self.pending.is_empty() {
            match self.rx.poll_recv(cx) {
                Poll::Ready(Some(chunk)) => self.pending = chunk,
                // End of stream
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }
        let n = buf.remaining().min(self.pending.len());
        let chunk = self.pending.split_to(n);
        buf.put_slice(&chunk);
        Poll::Ready(Ok(()))
    }
}

/// A response as it came off the wire
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Splits a complete response; header names are lowercased
    pub fn parse(data: &[u8]) -> Option<Self> {
        let head_end = memmem::find(data, b"\r\n\r\n")?;
        let head = std::str::from_utf8(&data[..head_end]).ok()?;
        let mut lines = head.split("\r\n");

        let mut status_line = lines.next()?.splitn(3, ' ');
        let version = status_line.next()?.to_owned();
        let status = status_line.next()?.parse().ok()?;
        let reason = status_line.next().unwrap_or_default().to_owned();

        let mut headers = HashMap::new();
        for line in lines {
            let (name, value) = line.split_once(": ")?;
            headers.insert(name.to_ascii_lowercase(), value.to_owned());
        }

        Some(Self {
            version,
            status,
            reason,
            headers,
            body: data[head_end + 4..].to_vec(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The body, gunzipped when `Content-Encoding: gzip` is set
    pub fn decoded_body(&self) -> std::io::Result<Vec<u8>> {
        match self.header("content-encoding") {
            Some("gzip") => gunzip(&self.body),
            _ => Ok(self.body.clone()),
        }
    }
}

pub fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// Writes `request` to `addr`, half-closes, and reads until the server closes the connection
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request).await?;
    stream.shutdown().await?;

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await?;
    Ok(out)
}

/// [`send_raw`], then [`RawResponse::parse`]
pub async fn request(addr: SocketAddr, request: &[u8]) -> std::io::Result<RawResponse> {
    let data = send_raw(addr, request).await?;
    RawResponse::parse(&data).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("not an http response: {:?}", String::from_utf8_lossy(&data)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trickle_reader_yields_everything() {
        const LINE: &[u8] = b"GET / HTTP/1.1\r\nHost: test\r\n\r\n";

        let mut reader = TrickleReader::bytewise(LINE);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, LINE);

        let mut reader = TrickleReader::from_chunks(
            [&LINE[..4], &LINE[4..]],
            Duration::from_millis(5),
        );
        let mut first = [0u8; 2];
        reader.read_exact(&mut first).await.unwrap();
        assert_eq!(&first, b"GE");
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, &LINE[2..]);
    }

    #[test]
    fn parse_raw_response() {
        let res = RawResponse::parse(
            b"HTTP/1.1 405 Not Allowed\r\nContent-Type: text/plain\r\n\r\n",
        )
        .unwrap();
        assert_eq!(res.status, 405);
        assert_eq!(res.reason, "Not Allowed");
        assert_eq!(res.header("content-type"), Some("text/plain"));
        assert!(res.body.is_empty());

        assert!(RawResponse::parse(b"HTTP/1.1 200 OK\r\n").is_none());
    }
}
