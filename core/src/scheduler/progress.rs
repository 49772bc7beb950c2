use sweepr_common::ScanProgress;
use tokio::sync::watch;

/// Serialized progress counters of one sweep.
///
/// Every mutation goes through [`watch::Sender::send_modify`], so each
/// snapshot a subscriber sees is consistent and never goes backwards.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<ScanProgress>,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        let (tx, _) = watch::channel(ScanProgress::new(total));
        Self { tx }
    }

    pub fn mark_dispatched(&self) {
        self.tx.send_modify(|p| {
            debug_assert!(p.dispatched < p.total, "dispatched past total");
            p.dispatched += 1;
        });
    }

    pub fn mark_completed(&self) {
        self.tx.send_modify(|p| {
            debug_assert!(p.completed < p.dispatched, "completed an undispatched probe");
            p.completed += 1;
        });
    }

    pub fn snapshot(&self) -> ScanProgress {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanProgress> {
        self.tx.subscribe()
    }
}
