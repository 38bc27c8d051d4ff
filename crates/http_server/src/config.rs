//! Command line configuration
//!
//! ```bash
//! skiff --directory /tmp/files --port 4221
//! SKIFF_DIRECTORY=/tmp/files SKIFF_STRICT=true skiff
//! ```

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;

use crate::{connection::ConnectionOptions, policy::Policy};

#[derive(Debug, Clone, Parser)]
#[command(name = "skiff")]
#[command(about = "A minimal HTTP/1.1 server on raw TCP sockets")]
#[command(version)]
pub struct Config {
    /// Directory served under /files/
    #[arg(long, default_value = ".", env = "SKIFF_DIRECTORY")]
    pub directory: PathBuf,

    /// Address to listen on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED), env = "SKIFF_HOST")]
    pub host: IpAddr,

    #[arg(short, long, default_value_t = 4221, env = "SKIFF_PORT")]
    pub port: u16,

    /// Seconds to wait on each read from a client, 0 waits forever
    #[arg(long = "read-timeout-secs", default_value_t = 0, env = "SKIFF_READ_TIMEOUT")]
    pub read_timeout_secs: u64,

    /// Reject malformed header lines and short bodies, and report failed writes as 500
    #[arg(long, env = "SKIFF_STRICT")]
    pub strict: bool,
}

impl Config {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn policy(&self) -> Policy {
        if self.strict {
            Policy::strict()
        } else {
            Policy::lenient()
        }
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            policy: self.policy(),
            read_timeout: (self.read_timeout_secs > 0)
                .then(|| Duration::from_secs(self.read_timeout_secs)),
        }
    }
}
