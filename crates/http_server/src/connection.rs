use std::{net::SocketAddr, time::Duration};

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    http::{
        HttpVersion,
        parser::{Parser, Sender},
        request::Request,
        response::{Response, ResponseBuilder},
    },
    policy::Policy,
    service::Service,
};

/// Per-connection settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionOptions {
    pub policy: Policy,
    /// Longest wait for a single read while decoding, `None` waits forever
    pub read_timeout: Option<Duration>,
}

/// Life of a connection, which serves exactly one request
///
/// There is no way back to [`ConnectionState::Reading`]: once a response is written the
/// connection closes.
enum ConnectionState<R: AsyncRead + Unpin> {
    Reading(Parser<R>),
    Dispatching(Request),
    Responding(Response),
    Closed,
}

impl<R: AsyncRead + Unpin> ConnectionState<R> {
    fn name(&self) -> &'static str {
        match self {
            Self::Reading(_) => "reading",
            Self::Dispatching(_) => "dispatching",
            Self::Responding(_) => "responding",
            Self::Closed => "closed",
        }
    }
}

/// Reads one request from `reader`, answers it on `writer` and shuts the writer down
///
/// A request that cannot be decoded is answered with its error status, unless the peer went
/// away or stalled, in which case nothing is written.
pub async fn serve_connection<S, R, W>(
    service: &S,
    reader: R,
    writer: W,
    options: &ConnectionOptions,
    remote: Option<SocketAddr>,
) -> std::io::Result<()>
where
    S: Service,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let parser = Parser::with_policy(reader, options.policy).read_timeout(options.read_timeout);
    let mut sender = Sender::new(writer);
    let mut state = ConnectionState::Reading(parser);

    loop {
        state = match state {
            ConnectionState::Reading(parser) => match parser.parse_request().await {
                Ok(mut req) => {
                    req.remote = remote;
                    ConnectionState::Dispatching(req)
                }
                Err(err) if err.is_connection_error() => {
                    debug!("dropping connection from {:?}: {}", remote, err);
                    ConnectionState::Closed
                }
                Err(err) => {
                    warn!("rejecting request from {:?}: {}", remote, err);
                    ConnectionState::Responding(
                        ResponseBuilder::new(HttpVersion::HTTP_1_1, err.status_code()).build(),
                    )
                }
            },
            ConnectionState::Dispatching(req) => {
                ConnectionState::Responding(service.call(req).await)
            }
            ConnectionState::Responding(res) => {
                sender.send_response(&res).await?;
                sender.shutdown().await?;
                ConnectionState::Closed
            }
            ConnectionState::Closed => return Ok(()),
        };
        debug!("connection {:?} is {}", remote, state.name());
    }
}
