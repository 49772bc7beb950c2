//! # Scan Session
//!
//! The externally visible handle around one sweep.
//!
//! ```text
//! Idle ──start──▶ Running ──drained──▶ Completed
//!   │                │
//!   │              cancel
//!   │                ▼
//!   │            Cancelling ──drained──▶ Cancelled
//!   └──bad range──▶ Failed
//! ```
//!
//! Terminal states never change. A new scan needs a new session.

use std::fmt;
use std::sync::Arc;

use sweepr_common::{
    AddressRange, InvalidRangeError, ProbeResult, ScanProgress, SweepConfig, success,
};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::cancel::CancellationSignal;
use crate::prober::Prober;
use crate::scheduler::{Sweep, SweepScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Running,
    Cancelling,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelling => "cancelling",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    #[error("session is already {0}")]
    AlreadyStarted(SessionState),
}

/// Something the presentation layer can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Probe(ProbeResult),
    Progress(ScanProgress),
    /// Always the last event of a started session.
    Finished(SessionState),
}

/// Live event stream of a started session.
#[derive(Debug)]
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionEvents {
    /// `None` after [`SessionEvent::Finished`] has been delivered.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: watch::Sender<SessionState>,
    cancel: CancellationSignal,
}

impl Lifecycle {
    /// Moves `Running` to `Cancelling`. Returns whether it did.
    fn request_cancel(&self) -> bool {
        let requested = self.state.send_if_modified(|state| {
            if *state != SessionState::Running {
                return false;
            }
            *state = SessionState::Cancelling;
            true
        });
        if requested {
            self.cancel.cancel();
        }
        requested
    }

    /// Settles the state after the sweep drained.
    fn finish(&self) -> SessionState {
        let cancelled = self.cancel.is_cancelled();
        self.state.send_modify(|state| {
            *state = match *state {
                SessionState::Cancelling => SessionState::Cancelled,
                SessionState::Running if cancelled => SessionState::Cancelled,
                SessionState::Running => SessionState::Completed,
                other => other,
            };
        });
        *self.state.borrow()
    }
}

/// Cloneable cancel button for a session, safe to move into other threads.
#[derive(Debug, Clone)]
pub struct SessionCanceller {
    lifecycle: Arc<Lifecycle>,
}

impl SessionCanceller {
    /// Idempotent; does nothing unless the session is running.
    pub fn cancel(&self) {
        if self.lifecycle.request_cancel() {
            info!("Cancellation requested, waiting for probes in flight");
        }
    }
}

/// Owns one sweep from start to a terminal state.
pub struct ScanSession {
    scheduler: SweepScheduler,
    lifecycle: Arc<Lifecycle>,
    progress: Option<watch::Receiver<ScanProgress>>,
    targets: Option<AddressRange>,
    failure: Option<InvalidRangeError>,
}

impl ScanSession {
    pub fn new(prober: Arc<dyn Prober>, config: &SweepConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            scheduler: SweepScheduler::new(prober, config),
            lifecycle: Arc::new(Lifecycle {
                state,
                cancel: CancellationSignal::new(),
            }),
            progress: None,
            targets: None,
            failure: None,
        }
    }

    /// Resolves `spec` and starts sweeping it in the background.
    ///
    /// Must be called from within a tokio runtime. An invalid range moves the
    /// session to [`SessionState::Failed`] before any probe is sent.
    pub fn start(&mut self, spec: &str) -> Result<SessionEvents, SessionError> {
        let state = self.state();
        if state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted(state));
        }

        let targets = match AddressRange::parse(spec) {
            Ok(targets) => targets,
            Err(e) => {
                debug!("Session failed to start: {e}");
                self.failure = Some(e.clone());
                self.lifecycle.state.send_replace(SessionState::Failed);
                return Err(e.into());
            }
        };

        info!("Sweeping {}", address_count(targets.len()));
        self.lifecycle.state.send_replace(SessionState::Running);

        let sweep = self
            .scheduler
            .run(targets.clone(), self.lifecycle.cancel.clone());
        self.progress = Some(sweep.subscribe_progress());
        self.targets = Some(targets);

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drive(sweep, Arc::clone(&self.lifecycle), tx));

        Ok(SessionEvents { rx })
    }

    pub fn cancel(&self) {
        self.canceller().cancel();
    }

    pub fn canceller(&self) -> SessionCanceller {
        SessionCanceller {
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.lifecycle.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.lifecycle.state.subscribe()
    }

    /// Latest counters; all zero before [`start`](Self::start).
    pub fn progress(&self) -> ScanProgress {
        self.progress
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or_default()
    }

    /// `None` until the session has started.
    pub fn subscribe_progress(&self) -> Option<watch::Receiver<ScanProgress>> {
        self.progress.clone()
    }

    pub fn targets(&self) -> Option<&AddressRange> {
        self.targets.as_ref()
    }

    /// The parse error that moved the session to `Failed`.
    pub fn failure(&self) -> Option<&InvalidRangeError> {
        self.failure.as_ref()
    }

    /// Resolves once the session reached a terminal state.
    ///
    /// Returns `Idle` at once for a session that was never started.
    pub async fn wait(&self) -> SessionState {
        let mut rx = self.subscribe_state();
        if *rx.borrow_and_update() == SessionState::Idle {
            return SessionState::Idle;
        }
        match rx.wait_for(|state| state.is_terminal()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.lifecycle.request_cancel();
    }
}

fn address_count(count: u64) -> String {
    let unit = if count == 1 { "address" } else { "addresses" };
    format!("{count} {unit}")
}

/// Forwards sweep output as session events, then settles the final state.
async fn drive(mut sweep: Sweep, lifecycle: Arc<Lifecycle>, events: mpsc::UnboundedSender<SessionEvent>) {
    let mut progress = sweep.subscribe_progress();
    let mut last_sent: Option<ScanProgress> = None;
    let mut alive: u64 = 0;

    loop {
        tokio::select! {
            result = sweep.next() => match result {
                Some(result) => {
                    alive += u64::from(result.alive);
                    let _ = events.send(SessionEvent::Probe(result));
                }
                None => break,
            },
            Ok(()) = progress.changed() => {
                let snapshot = *progress.borrow_and_update();
                last_sent = Some(snapshot);
                let _ = events.send(SessionEvent::Progress(snapshot));
            }
        }
    }

    let final_progress = sweep.progress();
    if last_sent != Some(final_progress) {
        let _ = events.send(SessionEvent::Progress(final_progress));
    }

    let state = lifecycle.finish();
    success!(
        "Sweep {state}: {alive} of {} probed hosts alive",
        final_progress.completed
    );
    let _ = events.send(SessionEvent::Finished(state));
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
