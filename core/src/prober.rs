//! The **abstraction** over a single reachability check.
//!
//! The sweep engine never decides *how* a host is tested. It hands each target
//! and a deadline to a [`Prober`] and only interprets the boolean that comes
//! back. Concrete strategies live in the submodules:
//!
//! * [`tcp`]: TCP connect against a small set of ports (unprivileged).
//! * [`ping`]: one ICMP echo through the system `ping` binary.

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod ping;
pub mod tcp;

pub use ping::PingCommandProber;
pub use tcp::TcpConnectProber;

/// Raised when a probe could not even be attempted.
///
/// A silent host is *not* an error; it is `Ok(false)`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe of {host} unavailable: {source}")]
    Unavailable {
        host: IpAddr,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    pub fn unavailable(host: IpAddr, source: io::Error) -> Self {
        Self::Unavailable { host, source }
    }
}

/// Tests whether one host is alive.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns `Ok(true)` if `host` answered before `deadline` elapsed.
    ///
    /// Implementations must not retry and should return within `deadline`;
    /// the scheduler cuts them off there regardless.
    async fn probe(&self, host: IpAddr, deadline: Duration) -> Result<bool, ProbeError>;

    /// Short label used in logs.
    fn name(&self) -> &'static str {
        "probe"
    }
}
