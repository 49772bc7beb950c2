use std::net::IpAddr;
use std::time::SystemTime;

/// Outcome of one dispatched probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub host: IpAddr,
    pub alive: bool,
    pub observed_at: SystemTime,
}

impl ProbeResult {
    /// Stamps the result with the current time.
    pub fn new(host: IpAddr, alive: bool) -> Self {
        Self {
            host,
            alive,
            observed_at: SystemTime::now(),
        }
    }
}

/// Progress counters of one sweep.
///
/// Every snapshot satisfies `completed <= dispatched <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub dispatched: u64,
    pub completed: u64,
    pub total: u64,
}

impl ScanProgress {
    pub fn new(total: u64) -> Self {
        Self {
            dispatched: 0,
            completed: 0,
            total,
        }
    }

    /// Probes dispatched but not yet completed.
    pub fn in_flight(&self) -> u64 {
        self.dispatched - self.completed
    }

    /// True once every target has been probed.
    pub fn is_exhausted(&self) -> bool {
        self.completed == self.total
    }

    /// Completed share of `total`, `1.0` for an empty sweep.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
