use std::sync::Arc;
use std::time::{Duration, Instant};

use sweepr_common::SweepConfig;
use sweepr_core::{ScanSession, SessionEvent, SessionState};

use crate::support::{self, Collected, ScriptedProber};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_after_ten_results() {
    let prober = Arc::new(ScriptedProber::dead(Duration::from_millis(20)));
    let config = SweepConfig::default()
        .with_concurrency(20)
        .with_launch_pacing(Duration::from_millis(10));
    let mut session = ScanSession::new(prober.clone(), &config);
    let mut events = session.start("192.168.1.0/24").unwrap();

    let mut collected = Collected::default();
    while collected.results.len() < 10 {
        match events.next().await {
            Some(SessionEvent::Probe(result)) => collected.results.push(result),
            Some(SessionEvent::Progress(progress)) => collected.progress.push(progress),
            other => panic!("sweep ended early: {other:?}"),
        }
    }
    session.cancel();
    assert_eq!(session.state(), SessionState::Cancelling);

    support::drain(&mut events, &mut collected).await;

    assert_eq!(collected.finished, Some(SessionState::Cancelled));
    assert_eq!(session.state(), SessionState::Cancelled);
    assert!(collected.results.len() >= 10);
    assert!(collected.results.len() < 254, "cancel did not stop dispatching");

    let progress = session.progress();
    assert_eq!(progress.completed, progress.dispatched);
    assert_eq!(progress.completed as usize, collected.results.len());
    assert_eq!(prober.calls(), collected.results.len());
    support::assert_progress_consistent(&collected.progress);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_of_large_range_drains_within_one_deadline() {
    let deadline = Duration::from_millis(300);
    let pacing = Duration::from_millis(5);
    // Probes never answer; each one runs into the deadline.
    let prober = Arc::new(ScriptedProber::dead(Duration::from_secs(30)));
    let config = SweepConfig::default()
        .with_concurrency(64)
        .with_launch_pacing(pacing)
        .with_probe_deadline(deadline);

    let mut session = ScanSession::new(prober, &config);
    let events = session.start("10.0.0.0/16").unwrap();
    let collector = tokio::spawn(support::collect(events));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let cancelled_at = Instant::now();
    session.cancel();

    let slack = Duration::from_millis(500);
    let state = tokio::time::timeout(deadline + pacing + slack, session.wait())
        .await
        .expect("session did not settle after cancel");
    assert_eq!(state, SessionState::Cancelled);
    assert!(cancelled_at.elapsed() < deadline + pacing + slack);

    let collected = collector.await.unwrap();
    assert!(collected.results.len() < 65_534);
    assert!(collected.results.iter().all(|r| !r.alive));
    assert_eq!(collected.finished, Some(SessionState::Cancelled));
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let config = SweepConfig::default().with_launch_pacing(Duration::from_millis(5));

    let mut once = ScanSession::new(Arc::new(ScriptedProber::dead(Duration::from_millis(10))), &config);
    let once_events = once.start("10.0.0.0/24").unwrap();
    once.cancel();
    let once_state = once.state();

    let mut many = ScanSession::new(Arc::new(ScriptedProber::dead(Duration::from_millis(10))), &config);
    let many_events = many.start("10.0.0.0/24").unwrap();
    for _ in 0..5 {
        many.cancel();
    }
    let canceller = many.canceller();
    canceller.cancel();
    assert_eq!(many.state(), once_state);
    assert_eq!(once_state, SessionState::Cancelling);

    let once_collected = support::collect(once_events).await;
    let many_collected = support::collect(many_events).await;

    assert_eq!(once_collected.finished, Some(SessionState::Cancelled));
    assert_eq!(many_collected.finished, Some(SessionState::Cancelled));
    assert_eq!(once.wait().await, many.wait().await);

    many.cancel();
    assert_eq!(many.state(), SessionState::Cancelled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn canceller_works_from_another_thread() {
    let prober = Arc::new(ScriptedProber::dead(Duration::from_millis(20)));
    let config = SweepConfig::default().with_launch_pacing(Duration::from_millis(5));
    let mut session = ScanSession::new(prober, &config);
    let events = session.start("172.16.0.0/20").unwrap();

    let canceller = session.canceller();
    let thread = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        canceller.cancel();
    });

    let collected = support::collect(events).await;
    thread.join().unwrap();

    assert_eq!(collected.finished, Some(SessionState::Cancelled));
    assert!(collected.results.len() < 4094);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_while_waiting_for_a_slot() {
    let deadline = Duration::from_millis(400);
    // The only slot stays busy until the deadline cuts the probe.
    let prober = Arc::new(ScriptedProber::dead(Duration::from_secs(30)));
    let config = SweepConfig::default()
        .with_concurrency(1)
        .with_launch_pacing(Duration::ZERO)
        .with_probe_deadline(deadline);

    let mut session = ScanSession::new(prober.clone(), &config);
    let events = session.start("10.0.0.0/24").unwrap();
    let collector = tokio::spawn(support::collect(events));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let cancelled_at = Instant::now();
    session.cancel();

    let state = tokio::time::timeout(deadline + Duration::from_millis(300), session.wait())
        .await
        .expect("session stayed blocked on the busy slot");
    assert_eq!(state, SessionState::Cancelled);
    assert!(cancelled_at.elapsed() < deadline + Duration::from_millis(300));

    let collected = collector.await.unwrap();
    assert_eq!(collected.results.len(), 1);
    assert_eq!(prober.calls(), 1);

    let progress = session.progress();
    assert_eq!(progress.dispatched, 1);
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.total, 254);
}
