use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 64;
pub const DEFAULT_LAUNCH_PACING: Duration = Duration::from_millis(10);
pub const DEFAULT_PROBE_DEADLINE: Duration = Duration::from_secs(1);

/// Tuning knobs of a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Upper bound on probes in flight at the same time.
    pub concurrency_limit: usize,
    /// Delay between two successive dispatches. Zero disables pacing.
    pub launch_pacing: Duration,
    /// Time a single probe may take before the host counts as dead.
    pub probe_deadline: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY,
            launch_pacing: DEFAULT_LAUNCH_PACING,
            probe_deadline: DEFAULT_PROBE_DEADLINE,
        }
    }
}

impl SweepConfig {
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    pub fn with_launch_pacing(mut self, pacing: Duration) -> Self {
        self.launch_pacing = pacing;
        self
    }

    pub fn with_probe_deadline(mut self, deadline: Duration) -> Self {
        self.probe_deadline = deadline;
        self
    }
}
