use std::io::{self, ErrorKind};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::debug;

use super::{ProbeError, Prober};

pub const DEFAULT_PORTS: &[u16] = &[80, 443, 22];

/// Declares a host alive when any of its ports completes or refuses a TCP
/// handshake. Both mean the host itself answered.
#[derive(Debug, Clone)]
pub struct TcpConnectProber {
    ports: Vec<u16>,
}

impl Default for TcpConnectProber {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
        }
    }
}

impl TcpConnectProber {
    /// Falls back to [`DEFAULT_PORTS`] when `ports` is empty.
    pub fn new(ports: Vec<u16>) -> Self {
        if ports.is_empty() {
            return Self::default();
        }
        Self { ports }
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, host: IpAddr, deadline: Duration) -> Result<bool, ProbeError> {
        let mut attempts: JoinSet<io::Result<bool>> = JoinSet::new();
        for &port in &self.ports {
            attempts.spawn(handshake(SocketAddr::new(host, port)));
        }

        let race = async {
            let mut last_error: Option<io::Error> = None;
            let mut answered_dead = false;

            while let Some(joined) = attempts.join_next().await {
                match joined {
                    Ok(Ok(true)) => return Ok(true),
                    Ok(Ok(false)) => answered_dead = true,
                    Ok(Err(e)) => last_error = Some(e),
                    Err(e) => debug!("handshake task for {host} failed: {e}"),
                }
            }

            match last_error {
                Some(e) if !answered_dead => Err(ProbeError::unavailable(host, e)),
                _ => Ok(false),
            }
        };

        // Dropping `attempts` on timeout aborts the handshakes still pending.
        match timeout(deadline, race).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Ok(false),
        }
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}

async fn handshake(addr: SocketAddr) -> io::Result<bool> {
    match TcpStream::connect(addr).await {
        Ok(_) => Ok(true),
        Err(e) => classify(e),
    }
}

/// Maps a connect error to liveness; errors that say nothing about the
/// remote host are passed through.
fn classify(err: io::Error) -> io::Result<bool> {
    match err.kind() {
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => Ok(true),
        ErrorKind::HostUnreachable
        | ErrorKind::NetworkUnreachable
        | ErrorKind::TimedOut
        | ErrorKind::ConnectionAborted => Ok(false),
        _ => Err(err),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_classify() {
        let refused = io::Error::from(ErrorKind::ConnectionRefused);
        assert!(classify(refused).unwrap());

        let unreachable = io::Error::from(ErrorKind::HostUnreachable);
        assert!(!classify(unreachable).unwrap());

        let denied = io::Error::from(ErrorKind::PermissionDenied);
        assert!(classify(denied).is_err());
    }

    #[test]
    fn test_empty_ports_fall_back_to_defaults() {
        assert_eq!(TcpConnectProber::new(vec![]).ports(), DEFAULT_PORTS);
        assert_eq!(TcpConnectProber::new(vec![8080]).ports(), &[8080]);
    }

    #[tokio::test]
    async fn test_open_port_is_alive() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let prober = TcpConnectProber::new(vec![port]);
        let alive = prober.probe(LOCALHOST, Duration::from_secs(1)).await.unwrap();
        assert!(alive);
    }

    #[tokio::test]
    async fn test_refused_port_is_alive() {
        // Bind then drop to get a port that is very likely closed.
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let prober = TcpConnectProber::new(vec![port]);
        let alive = prober.probe(LOCALHOST, Duration::from_secs(1)).await.unwrap();
        assert!(alive);
    }

    #[tokio::test]
    #[ignore]
    async fn test_unroutable_host_is_dead() {
        let ip: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 1));
        let prober = TcpConnectProber::default();
        let alive = prober.probe(ip, Duration::from_millis(300)).await.unwrap();
        assert!(!alive);
    }
}
