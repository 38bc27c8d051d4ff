//! A small HTTP/1.1 server working straight on TCP sockets
//!
//! Every connection carries exactly one request: it is decoded off the socket, routed to one of
//! a fixed set of handlers, answered, and the connection is closed.

pub mod config;
pub mod connection;
pub mod http;
pub mod policy;
pub mod service;

use std::{net::SocketAddr, sync::Arc};

use log::{debug, error, info};
use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::{
    connection::{ConnectionOptions, serve_connection},
    service::Service,
};

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub struct HttpServer<S: Service>(Arc<HttpServerInternal<S>>);

impl<S: Service> HttpServer<S> {
    pub fn new<A: Into<SocketAddr>>(addr: A, service: S) -> Self {
        Self::with_options(addr, service, ConnectionOptions::default())
    }

    pub fn with_options<A: Into<SocketAddr>>(
        addr: A,
        service: S,
        options: ConnectionOptions,
    ) -> Self {
        Self(Arc::new(HttpServerInternal {
            addr: addr.into(),
            service,
            options,
        }))
    }

    /// Binds the listening socket without accepting yet
    pub fn bind(&self) -> Result<Listening<S>, HttpServerError> {
        HttpServerInternal::bind(self.0.clone())
    }

    pub async fn serve(&self) -> Result<(), HttpServerError> {
        self.bind()?.serve().await
    }
}

/// A bound server, ready to accept connections
pub struct Listening<S: Service> {
    listener: TcpListener,
    server: Arc<HttpServerInternal<S>>,
}

impl<S: Service> Listening<S> {
    pub fn local_addr(&self) -> Result<SocketAddr, HttpServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts forever, one task per connection
    pub async fn serve(self) -> Result<(), HttpServerError> {
        info!("listening on {}", self.local_addr()?);
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    tokio::spawn(HttpServerInternal::handle_connection(
                        self.server.clone(),
                        stream,
                        addr,
                    ));
                }
                // Only this connection is lost
                Err(err) => error!("error accepting connection: {}", err),
            }
        }
    }
}

pub(crate) struct HttpServerInternal<S: Service> {
    addr: SocketAddr,
    service: S,
    options: ConnectionOptions,
}

impl<S: Service> HttpServerInternal<S> {
    fn bind(sel: Arc<Self>) -> Result<Listening<S>, HttpServerError> {
        let sock = match sel.addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };

        sock.set_reuseaddr(true)?;
        sock.bind(sel.addr)?;

        let listener = sock.listen(1024)?;
        Ok(Listening {
            listener,
            server: sel,
        })
    }

    async fn handle_connection(sel: Arc<Self>, stream: TcpStream, addr: SocketAddr) {
        debug!("accepted connection from {}", addr);
        let (reader, writer) = stream.into_split();
        if let Err(err) =
            serve_connection(&sel.service, reader, writer, &sel.options, Some(addr)).await
        {
            error!("connection from {} failed: {}", addr, err);
        }
    }
}
