//! # sweepr core
//!
//! The concurrent sweep engine: bounded-concurrency liveness probing of an
//! address range with cooperative cancellation.
//!
//! * **[`session`]**: lifecycle handle the presentation layer talks to.
//! * **[`scheduler`]**: dispatch loop, concurrency slots and progress.
//! * **[`prober`]**: the pluggable reachability check and its implementations.
//! * **[`cancel`]**: the set-once stop signal.

pub mod cancel;
pub mod prober;
pub mod scheduler;
pub mod session;

pub use cancel::CancellationSignal;
pub use prober::{PingCommandProber, ProbeError, Prober, TcpConnectProber};
pub use scheduler::{Sweep, SweepScheduler};
pub use session::{
    ScanSession, SessionCanceller, SessionError, SessionEvent, SessionEvents, SessionState,
};
