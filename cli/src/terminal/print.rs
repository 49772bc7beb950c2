use std::net::IpAddr;
use std::time::Duration;

use colored::*;
use tracing::info;

use crate::terminal::colors;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

/// A `[✔]` line that survives `-q`, unlike [`sweepr_common::success`].
pub fn success(msg: &str) {
    info!(target: PRINT_TARGET, status = "success", "{msg}");
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

/// One host line: `[idx] address ...... +1.23s`.
pub fn host_line(idx: usize, host: &IpAddr, seen_after: Duration, alive: bool) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let addr: String = host.to_string();
    let addr_color = if alive { colors::IPV4_ADDR } else { colors::DEAD };
    let dots: String = ".".repeat(24usize.saturating_sub(addr.len()));
    let output: String = format!(
        "{} {} {} {}",
        idx_str.color(colors::SEPARATOR),
        addr.color(addr_color),
        dots.color(colors::SEPARATOR),
        format!("+{:.2}s", seen_after.as_secs_f64()).color(colors::TEXT_DEFAULT)
    );
    print(&output);
}

const NO_RESULTS_0: &str = r#"
         _   _  ___    _   _  ___  ____ _____ ____
        | \ | |/ _ \  | | | |/ _ \/ ___|_   _/ ___|
        |  \| | | | | | |_| | | | \___ \ | | \___ \
        | |\  | |_| | |  _  | |_| |___) || |  ___) |
        |_| \_|\___/  |_| |_|\___/|____/ |_| |____/
"#;

pub fn no_results() {
    print(&format!("{}", NO_RESULTS_0.red().bold()));
}
