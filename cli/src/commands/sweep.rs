use std::time::{Duration, Instant, SystemTime};

use colored::*;
use tracing::info_span;

use crate::commands::SweepArgs;
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, print, progress};
use sweepr_common::{ProbeResult, ScanProgress};
use sweepr_core::{ScanSession, SessionEvent, SessionState};

struct Outcome {
    alive: Vec<ProbeResult>,
    dead: Vec<ProbeResult>,
    state: SessionState,
    progress: ScanProgress,
    started_at: SystemTime,
    total_time: Duration,
}

pub async fn sweep(args: SweepArgs, quiet: u8) -> anyhow::Result<()> {
    let mut session = ScanSession::new(args.prober(), &args.config());

    let started_at = SystemTime::now();
    let start_time = Instant::now();
    let mut events = session.start(&args.range)?;

    let span = info_span!("sweep", indicatif.pb_show = true);
    progress::init(&span, session.progress().total, !args.no_input);
    let guard = span.enter();

    let input = if args.no_input {
        let canceller = session.canceller();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                canceller.cancel();
            }
        });
        None
    } else {
        Some(InputHandle::start(session.canceller()))
    };

    let mut alive: Vec<ProbeResult> = Vec::new();
    let mut dead: Vec<ProbeResult> = Vec::new();
    let mut state = SessionState::Running;

    while let Some(event) = events.next().await {
        match event {
            SessionEvent::Probe(result) if result.alive => alive.push(result),
            SessionEvent::Probe(result) => {
                if args.all {
                    dead.push(result);
                }
            }
            SessionEvent::Progress(snapshot) => progress::report(&span, snapshot, alive.len()),
            SessionEvent::Finished(final_state) => state = final_state,
        }
    }

    drop(input);
    drop(guard);
    drop(span);

    sweep_ends(
        Outcome {
            alive,
            dead,
            state,
            progress: session.progress(),
            started_at,
            total_time: start_time.elapsed(),
        },
        quiet,
    );
    Ok(())
}

fn sweep_ends(mut outcome: Outcome, quiet: u8) {
    if outcome.alive.is_empty() && outcome.dead.is_empty() {
        print::header("zero hosts alive", quiet);
        print::no_results();
    } else {
        outcome.alive.sort_by_key(|r| r.host);
        outcome.dead.sort_by_key(|r| r.host);

        if !outcome.alive.is_empty() {
            print::header("live hosts", quiet);
            print_hosts(&outcome.alive, outcome.started_at);
        }
        if !outcome.dead.is_empty() {
            print::header("no answer", quiet);
            print_hosts(&outcome.dead, outcome.started_at);
        }
    }

    print_summary(&outcome, quiet);
}

fn print_hosts(results: &[ProbeResult], started_at: SystemTime) {
    for (idx, result) in results.iter().enumerate() {
        let seen_after = result
            .observed_at
            .duration_since(started_at)
            .unwrap_or_default();
        print::host_line(idx, &result.host, seen_after, result.alive);
    }
}

fn print_summary(outcome: &Outcome, quiet: u8) {
    let output = summary_line(outcome);

    match quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => print::success(&output),
    }
}

fn summary_line(outcome: &Outcome) -> String {
    let active_hosts: ColoredString = format!("{} live hosts", outcome.alive.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", outcome.total_time.as_secs_f64()).bold().yellow();
    let verb = match outcome.state {
        SessionState::Cancelled => "Sweep Cancelled",
        _ => "Sweep Complete",
    };

    let mut output: String = format!(
        "{verb}: {active_hosts} out of {} probed in {total_time}",
        outcome.progress.completed
    );
    let skipped = outcome.progress.total - outcome.progress.dispatched;
    if skipped > 0 {
        output.push_str(&format!(", {} skipped", skipped.to_string().color(colors::ACCENT)));
    }
    output.color(colors::TEXT_DEFAULT).to_string()
}
