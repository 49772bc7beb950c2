pub mod expand;
pub mod sweep;

use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use sweepr_common::SweepConfig;
use sweepr_common::config::{DEFAULT_CONCURRENCY, DEFAULT_LAUNCH_PACING, DEFAULT_PROBE_DEADLINE};
use sweepr_core::prober::tcp::DEFAULT_PORTS;
use sweepr_core::{PingCommandProber, Prober, TcpConnectProber};

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(version, about = "Find the live hosts in an address range.")]
pub struct CommandLine {
    /// Print less (-q hides progress logs, -qq hides warnings too)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every host in a range and list the live ones
    #[command(alias = "s")]
    Sweep(SweepArgs),
    /// Print the addresses a range resolves to, without probing
    #[command(alias = "e")]
    Expand {
        /// CIDR block, address, dash range or comma-separated list
        range: String,
    },
}

#[derive(Args)]
pub struct SweepArgs {
    /// CIDR block, address, dash range or comma-separated list (e.g. 192.168.1.0/24)
    pub range: String,

    /// Maximum number of probes in flight
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Delay between two probe launches, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_LAUNCH_PACING.as_millis() as u64)]
    pub pacing: u64,

    /// Time a host gets to answer, in milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = DEFAULT_PROBE_DEADLINE.as_millis() as u64)]
    pub timeout: u64,

    /// How liveness is tested
    #[arg(short, long, value_enum, default_value_t = Method::Tcp)]
    pub method: Method,

    /// Ports tried by the tcp method
    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_PORTS.to_vec())]
    pub ports: Vec<u16>,

    /// Also list hosts that did not answer
    #[arg(short, long)]
    pub all: bool,

    /// Do not read the keyboard; cancel with Ctrl-C instead of 'q'
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// TCP connect; a refused connection also counts as alive
    Tcp,
    /// One ICMP echo through the system ping binary
    Ping,
}

impl SweepArgs {
    pub fn config(&self) -> SweepConfig {
        SweepConfig::default()
            .with_concurrency(self.concurrency)
            .with_launch_pacing(Duration::from_millis(self.pacing))
            .with_probe_deadline(Duration::from_millis(self.timeout.max(1)))
    }

    pub fn prober(&self) -> Arc<dyn Prober> {
        match self.method {
            Method::Tcp => Arc::new(TcpConnectProber::new(self.ports.clone())),
            Method::Ping => Arc::new(PingCommandProber::default()),
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
