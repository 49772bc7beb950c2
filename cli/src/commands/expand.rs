use std::io::{self, BufWriter, Write};

use sweepr_common::AddressRange;

use crate::terminal::print;

/// Writes every address of `range` to stdout, one per line.
pub fn expand(range: &str) -> anyhow::Result<()> {
    let targets = AddressRange::parse(range)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for addr in targets.iter() {
        writeln!(out, "{addr}")?;
    }
    out.flush()?;

    let unit: &str = if targets.len() == 1 { "address" } else { "addresses" };
    print::success(&format!("{} {unit} in {}", targets.len(), targets));
    Ok(())
}
