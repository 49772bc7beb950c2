//! The **sweep engine**.
//!
//! A [`SweepScheduler`] walks an [`AddressRange`] in ascending order and
//! dispatches one probe task per address. Three things gate each dispatch:
//!
//! 1. the [`CancellationSignal`], checked before every target;
//! 2. a free slot in a semaphore of `concurrency_limit` permits;
//! 3. the launch pacing delay since the previous dispatch.
//!
//! Waits (2) and (3) race the signal, so a cancel takes effect at the next
//! check point instead of after a full sleep. Probes already in flight are
//! never aborted; their deadline bounds how long a cancelled sweep drains.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use sweepr_common::{AddressRange, ProbeResult, ScanProgress, SweepConfig};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationSignal;
use crate::prober::Prober;

mod progress;

pub use progress::ProgressTracker;

/// Runs sweeps with a fixed prober and tuning.
#[derive(Clone)]
pub struct SweepScheduler {
    prober: Arc<dyn Prober>,
    concurrency_limit: usize,
    launch_pacing: Duration,
    probe_deadline: Duration,
}

impl SweepScheduler {
    pub fn new(prober: Arc<dyn Prober>, config: &SweepConfig) -> Self {
        Self {
            prober,
            concurrency_limit: config.concurrency_limit.clamp(1, Semaphore::MAX_PERMITS),
            launch_pacing: config.launch_pacing,
            probe_deadline: config.probe_deadline,
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Starts sweeping `targets` on the current tokio runtime.
    ///
    /// Returns immediately; results are pulled from the returned [`Sweep`].
    /// Cancelling `cancel` or dropping the [`Sweep`] stops dispatching.
    pub fn run(&self, targets: AddressRange, cancel: CancellationSignal) -> Sweep {
        let cancel = cancel.child();
        let progress = Arc::new(ProgressTracker::new(targets.len()));
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher {
            prober: Arc::clone(&self.prober),
            slots: Arc::new(Semaphore::new(self.concurrency_limit)),
            launch_pacing: self.launch_pacing,
            probe_deadline: self.probe_deadline,
            progress: Arc::clone(&progress),
            results: results_tx,
            cancel: cancel.clone(),
        };

        Sweep {
            results: results_rx,
            progress,
            dispatcher: tokio::spawn(dispatcher.run(targets)),
            cancel,
        }
    }
}

/// One running sweep: a finite, unordered sequence of [`ProbeResult`]s.
///
/// The sequence ends once dispatching has stopped and every dispatched probe
/// has reported. Dropping it stops dispatching; probes in flight still run
/// to their deadline.
pub struct Sweep {
    results: mpsc::UnboundedReceiver<ProbeResult>,
    progress: Arc<ProgressTracker>,
    dispatcher: JoinHandle<()>,
    cancel: CancellationSignal,
}

impl Sweep {
    /// Next result in completion order, `None` once the sweep has drained.
    pub async fn next(&mut self) -> Option<ProbeResult> {
        self.results.recv().await
    }

    /// Drains the sweep into a vector.
    pub async fn collect(mut self) -> Vec<ProbeResult> {
        let mut collected = Vec::new();
        while let Some(result) = self.next().await {
            collected.push(result);
        }
        collected
    }

    pub fn progress(&self) -> ScanProgress {
        self.progress.snapshot()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ScanProgress> {
        self.progress.subscribe()
    }

    /// True once the dispatcher has stopped launching and reaped its workers.
    pub fn is_drained(&self) -> bool {
        self.dispatcher.is_finished()
    }
}

impl Drop for Sweep {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Dispatcher {
    prober: Arc<dyn Prober>,
    slots: Arc<Semaphore>,
    launch_pacing: Duration,
    probe_deadline: Duration,
    progress: Arc<ProgressTracker>,
    results: mpsc::UnboundedSender<ProbeResult>,
    cancel: CancellationSignal,
}

impl Dispatcher {
    async fn run(self, targets: AddressRange) {
        let mut workers: JoinSet<()> = JoinSet::new();
        let mut hosts = targets.iter().peekable();

        while let Some(host) = hosts.next() {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(slot) = self.acquire_slot().await else {
                break;
            };

            self.progress.mark_dispatched();
            workers.spawn(probe_worker(
                Arc::clone(&self.prober),
                IpAddr::V4(host),
                self.probe_deadline,
                Report::new(IpAddr::V4(host), &self, slot),
            ));

            while let Some(joined) = workers.try_join_next() {
                reap(joined);
            }

            if hosts.peek().is_some() && !self.pace().await {
                break;
            }
        }

        let dispatched = self.progress.snapshot();
        if self.cancel.is_cancelled() {
            info!(
                "Sweep cancelled after {} of {} dispatches, draining {} in flight",
                dispatched.dispatched,
                dispatched.total,
                dispatched.in_flight()
            );
        } else {
            debug!("All {} targets dispatched", dispatched.dispatched);
        }

        while let Some(joined) = workers.join_next().await {
            reap(joined);
        }
    }

    /// Waits for a free concurrency slot, `None` if cancelled first.
    async fn acquire_slot(&self) -> Option<OwnedSemaphorePermit> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            permit = Arc::clone(&self.slots).acquire_owned() => permit.ok(),
        }
    }

    /// Sleeps one pacing interval, `false` if cancelled meanwhile.
    async fn pace(&self) -> bool {
        if self.launch_pacing.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = sleep(self.launch_pacing) => true,
        }
    }
}

/// Publishes a worker's outcome when dropped, so a panicking prober still
/// yields exactly one (dead) result and frees its slot.
struct Report {
    host: IpAddr,
    alive: bool,
    progress: Arc<ProgressTracker>,
    results: mpsc::UnboundedSender<ProbeResult>,
    _slot: OwnedSemaphorePermit,
}

impl Report {
    fn new(host: IpAddr, dispatcher: &Dispatcher, slot: OwnedSemaphorePermit) -> Self {
        Self {
            host,
            alive: false,
            progress: Arc::clone(&dispatcher.progress),
            results: dispatcher.results.clone(),
            _slot: slot,
        }
    }
}

impl Drop for Report {
    fn drop(&mut self) {
        self.progress.mark_completed();
        // The receiver may be gone if the caller stopped listening.
        let _ = self.results.send(ProbeResult::new(self.host, self.alive));
    }
}

async fn probe_worker(prober: Arc<dyn Prober>, host: IpAddr, deadline: Duration, mut report: Report) {
    report.alive = match timeout(deadline, prober.probe(host, deadline)).await {
        Ok(Ok(alive)) => alive,
        Ok(Err(e)) => {
            warn!("{e}, counting {host} as dead");
            false
        }
        Err(_elapsed) => {
            debug!("{} probe of {host} overran {deadline:?}", prober.name());
            false
        }
    };

    if report.alive {
        debug!("{host} is alive");
    }
}

fn reap(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Probe worker failed: {e}");
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
