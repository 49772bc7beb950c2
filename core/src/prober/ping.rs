use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::{ProbeError, Prober};

/// Sends one ICMP echo by running the system `ping` binary.
///
/// Needs no raw-socket privileges of its own; the binary carries them.
#[derive(Debug, Clone)]
pub struct PingCommandProber {
    program: String,
}

impl Default for PingCommandProber {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
        }
    }
}

impl PingCommandProber {
    /// Uses `program` instead of `ping` from `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, host: IpAddr, deadline: Duration) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(ping_args(host, deadline))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Prober for PingCommandProber {
    async fn probe(&self, host: IpAddr, deadline: Duration) -> Result<bool, ProbeError> {
        let mut child = self
            .command(host, deadline)
            .spawn()
            .map_err(|e| ProbeError::unavailable(host, e))?;

        match timeout(deadline, child.wait()).await {
            Ok(Ok(status)) => Ok(status.success()),
            Ok(Err(e)) => Err(ProbeError::unavailable(host, e)),
            // `kill_on_drop` reaps the child when it goes out of scope.
            Err(_elapsed) => Ok(false),
        }
    }

    fn name(&self) -> &'static str {
        "ping"
    }
}

#[cfg(windows)]
fn ping_args(host: IpAddr, deadline: Duration) -> Vec<String> {
    vec![
        "-n".to_string(),
        "1".to_string(),
        "-w".to_string(),
        deadline.as_millis().max(1).to_string(),
        host.to_string(),
    ]
}

#[cfg(not(windows))]
fn ping_args(host: IpAddr, _deadline: Duration) -> Vec<String> {
    // `-W` units differ between Linux and BSD; the outer timeout bounds us.
    vec!["-c".to_string(), "1".to_string(), host.to_string()]
}
