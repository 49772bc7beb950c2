//! Shared models of the sweepr workspace: address ranges, probe results,
//! progress counters, configuration and errors.

pub mod config;
pub mod error;
pub mod log;
pub mod network;

pub use config::SweepConfig;
pub use error::{InvalidRangeError, RangeErrorKind};
pub use network::probe::{ProbeResult, ScanProgress};
pub use network::range::{AddressRange, Ipv4Range};

#[doc(hidden)]
pub use tracing;
