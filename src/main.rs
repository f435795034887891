//! Headless runner (default binary).
//!
//! Plays one round with the placement engine at a fixed 16 ms tick, streams session
//! events to stdout as JSON lines and logs lifecycle lines to stderr.

use std::io::{self, BufWriter, Write};

use anyhow::Result;

use blockfall::runner::{mode_name, run, RunnerConfig};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = RunnerConfig::from_env();
    config.apply_args(&args)?;

    eprintln!(
        "[Runner] starting mode={} seed={} max_ticks={}",
        mode_name(config.mode),
        config.seed,
        config.max_ticks
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = run(&config, &mut out)?;
    out.flush()?;

    match summary.reason {
        Some(reason) => eprintln!("[Runner] round ended: {:?}", reason),
        None => eprintln!("[Runner] tick budget exhausted"),
    }
    eprintln!(
        "[Runner] score={} lines={} level={} pieces={} ticks={}",
        summary.score, summary.lines, summary.level, summary.pieces, summary.ticks
    );
    Ok(())
}
