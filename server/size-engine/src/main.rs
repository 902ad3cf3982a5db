//! Binary entrypoint: read one JSON object from stdin, write one diff report to stdout.
//!
//! Input is a `DiffInput` (current + base snapshots). Invalid input produces an
//! `ErrorOutput` on stdout and exit code 1. Logs go to stderr.

use std::io::{self, Read, Write};

use size_engine::{run, DiffInput, ErrorOutput};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run_binary() {
    error!(error = %e, "size-engine failed");
    let err = ErrorOutput::new(e.to_string());
    let _ = serde_json::to_writer(io::stdout(), &err);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), Box<dyn std::error::Error>> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let input: DiffInput = serde_json::from_str(&raw)?;
  debug!(files = input.files.len(), base_files = input.base_files.len(), "diffing snapshots");

  let out = run(&input);
  let json = serde_json::to_vec(&out)?;
  io::stdout().write_all(&json)?;
  Ok(())
}
