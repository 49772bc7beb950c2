use colored::*;
use indicatif::ProgressStyle;
use sweepr_common::ScanProgress;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];
const TEMPLATE: &str = "{spinner:.blue} {bar:32.green/bright_black} {pos}/{len} {msg}";

/// Turns `span` into a progress bar of `total` steps. Call before entering it.
pub fn init(span: &Span, total: u64, with_tip: bool) {
    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
        .tick_strings(TICKS);

    span.pb_set_style(&style);
    span.pb_set_length(total);
    if with_tip {
        span.pb_set_message(&format!("{}", "press 'q' to finish early".italic().white()));
    }
}

pub fn report(span: &Span, progress: ScanProgress, alive: usize) {
    span.pb_set_position(progress.completed);
    span.pb_set_message(
        &format!(
            "{} alive, {} in flight",
            alive.to_string().green().bold(),
            progress.in_flight()
        )
        .color(colors::TEXT_DEFAULT)
        .to_string(),
    );
}
