use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use sweepr_common::{RangeErrorKind, SweepConfig};
use sweepr_core::{ScanSession, SessionError, SessionState};

use crate::support::{self, ScriptedProber};

fn config(limit: usize) -> SweepConfig {
    SweepConfig::default()
        .with_concurrency(limit)
        .with_launch_pacing(Duration::from_millis(1))
        .with_probe_deadline(Duration::from_secs(1))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn all_dead_slash_24_completes() -> anyhow::Result<()> {
    let prober = Arc::new(ScriptedProber::dead(Duration::from_millis(5)));
    let mut session = ScanSession::new(prober.clone(), &config(20));

    let events = session.start("192.168.1.0/24")?;
    assert_eq!(session.state(), SessionState::Running);

    let collected = support::collect(events).await;

    assert_eq!(collected.results.len(), 254);
    assert!(collected.results.iter().all(|r| !r.alive));
    assert_eq!(collected.finished, Some(SessionState::Completed));
    assert_eq!(collected.after_finish, 0);
    assert_eq!(session.wait().await, SessionState::Completed);

    let progress = session.progress();
    assert_eq!(progress.completed, 254);
    assert_eq!(progress.dispatched, 254);
    assert_eq!(progress.total, 254);
    assert_eq!(collected.progress.last(), Some(&progress));
    support::assert_progress_consistent(&collected.progress);

    assert_eq!(prober.calls(), 254);
    assert!(prober.peak() <= 20, "peak in flight was {}", prober.peak());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn live_hosts_are_reported_once_each() {
    let prober = Arc::new(ScriptedProber::with_alive(Duration::from_millis(2), [1, 7, 13]));
    let mut session = ScanSession::new(prober, &config(8));

    let collected = support::collect(session.start("10.9.8.0/28").unwrap()).await;

    let hosts: HashSet<IpAddr> = collected.results.iter().map(|r| r.host).collect();
    assert_eq!(collected.results.len(), 14);
    assert_eq!(hosts.len(), 14);

    let alive: HashSet<IpAddr> = collected
        .results
        .iter()
        .filter(|r| r.alive)
        .map(|r| r.host)
        .collect();
    let expected: HashSet<IpAddr> = [1, 7, 13]
        .into_iter()
        .map(|octet| IpAddr::V4(Ipv4Addr::new(10, 9, 8, octet)))
        .collect();
    assert_eq!(alive, expected);
}

#[tokio::test]
async fn invalid_range_fails_before_any_probe() {
    let prober = Arc::new(ScriptedProber::dead(Duration::ZERO));
    let mut session = ScanSession::new(prober.clone(), &config(4));

    let invalid = match session.start("not-an-ip/40") {
        Err(SessionError::InvalidRange(invalid)) => invalid,
        other => panic!("expected an invalid range error, got {other:?}"),
    };
    assert_eq!(invalid.input, "not-an-ip/40");
    assert!(matches!(invalid.kind, RangeErrorKind::InvalidAddress { .. }));

    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.failure(), Some(&invalid));
    assert_eq!(session.wait().await, SessionState::Failed);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(prober.calls(), 0);
    assert_eq!(session.progress().total, 0);
}

#[tokio::test]
async fn failed_session_cannot_be_restarted() {
    let mut session = ScanSession::new(Arc::new(ScriptedProber::dead(Duration::ZERO)), &config(4));
    assert!(session.start("").is_err());

    let err = session.start("10.0.0.1").unwrap_err();
    assert!(matches!(err, SessionError::AlreadyStarted(SessionState::Failed)));
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn single_host_and_point_to_point_ranges() {
    let mut single = ScanSession::new(Arc::new(ScriptedProber::dead(Duration::ZERO)), &config(4));
    let collected = support::collect(single.start("10.0.0.5/32").unwrap()).await;
    assert_eq!(collected.results.len(), 1);
    assert_eq!(collected.results[0].host, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)));

    let mut p2p = ScanSession::new(Arc::new(ScriptedProber::dead(Duration::ZERO)), &config(4));
    let collected = support::collect(p2p.start("10.0.0.0/31").unwrap()).await;
    assert_eq!(collected.results.len(), 2);
    assert_eq!(p2p.wait().await, SessionState::Completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn state_changes_are_observable() {
    let prober = Arc::new(ScriptedProber::dead(Duration::from_millis(50)));
    let mut session = ScanSession::new(prober, &config(4));
    let mut states = session.subscribe_state();
    assert_eq!(*states.borrow_and_update(), SessionState::Idle);

    let events = session.start("10.0.0.0/29").unwrap();
    states.changed().await.unwrap();
    assert_eq!(*states.borrow_and_update(), SessionState::Running);

    support::collect(events).await;
    let terminal = states.wait_for(|s| s.is_terminal()).await.unwrap();
    assert_eq!(*terminal, SessionState::Completed);
}
