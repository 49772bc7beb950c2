use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::{ProbeResult, ScanProgress};
use sweepr_core::{ProbeError, Prober, SessionEvent, SessionEvents, SessionState};

/// Answers after `delay`; hosts whose last octet is in `alive` are up.
///
/// Counts calls and records the peak number of concurrent probes.
pub struct ScriptedProber {
    delay: Duration,
    alive: HashSet<u8>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedProber {
    pub fn dead(delay: Duration) -> Self {
        Self::with_alive(delay, [])
    }

    pub fn with_alive(delay: Duration, alive: impl IntoIterator<Item = u8>) -> Self {
        Self {
            delay,
            alive: alive.into_iter().collect(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, host: IpAddr, _deadline: Duration) -> Result<bool, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let alive = match host {
            IpAddr::V4(v4) => self.alive.contains(&v4.octets()[3]),
            IpAddr::V6(_) => false,
        };
        Ok(alive)
    }
}

/// Everything a session emitted, in arrival order.
#[derive(Default)]
pub struct Collected {
    pub results: Vec<ProbeResult>,
    pub progress: Vec<ScanProgress>,
    pub finished: Option<SessionState>,
    /// Events received after `Finished`; must stay zero.
    pub after_finish: usize,
}

pub async fn drain(events: &mut SessionEvents, into: &mut Collected) {
    while let Some(event) = events.next().await {
        if into.finished.is_some() {
            into.after_finish += 1;
        }
        match event {
            SessionEvent::Probe(result) => into.results.push(result),
            SessionEvent::Progress(progress) => into.progress.push(progress),
            SessionEvent::Finished(state) => into.finished = Some(state),
        }
    }
}

pub async fn collect(mut events: SessionEvents) -> Collected {
    let mut collected = Collected::default();
    drain(&mut events, &mut collected).await;
    collected
}

/// Asserts the progress invariants over a whole session's updates.
pub fn assert_progress_consistent(updates: &[ScanProgress]) {
    let mut previous = ScanProgress::default();
    for update in updates {
        assert!(update.completed <= update.dispatched, "{update:?}");
        assert!(update.dispatched <= update.total, "{update:?}");
        assert!(update.completed >= previous.completed, "{previous:?} -> {update:?}");
        assert!(update.dispatched >= previous.dispatched, "{previous:?} -> {update:?}");
        previous = *update;
    }
}
