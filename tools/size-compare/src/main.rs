//! size-compare: offline bundle size diff for CI scripts
//!
//! Usage:
//!   size-compare <current.json> [base.json]   # print per-file changes and limit failures
//!   size-compare <current.json> <base.json> -q  # quiet: exit 0 on pass, 1 on fail
//!   size-compare <current.json> <base.json> --json  # print the diff report as JSON
//!
//! Snapshot files hold `{"files": [...], "groups": [...]}` with the same file entries
//! CI uploads. Without a base, every file is reported as added. Exit code 2 means the
//! input could not be read.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use size_engine::report::diff_report;
use size_engine::types::{DiffChange, DiffReport, FileDiff, Status};
use size_engine::FileMetric;

#[derive(Parser, Debug)]
#[command(name = "size-compare", about = "Diff two bundle size snapshots and check limits")]
struct Args {
    /// Snapshot of the build being checked.
    current: PathBuf,
    /// Snapshot to compare against.
    base: Option<PathBuf>,
    /// Only set the exit code (0 = pass, 1 = fail).
    #[arg(short, long)]
    quiet: bool,
    /// Print the full report as JSON.
    #[arg(long, conflicts_with = "quiet")]
    json: bool,
}

#[derive(serde::Deserialize, Default)]
struct Snapshot {
    #[serde(default)]
    files: Vec<FileMetric>,
    #[serde(default)]
    groups: Vec<FileMetric>,
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let contents = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid snapshot JSON in {}", path.display()))
}

fn format_bytes(bytes: i64) -> String {
    let abs = bytes.unsigned_abs() as f64;
    let sign = if bytes < 0 { "-" } else { "" };
    if abs >= 1024.0 * 1024.0 {
        format!("{}{:.2}MB", sign, abs / (1024.0 * 1024.0))
    } else if abs >= 1024.0 {
        format!("{}{:.2}KB", sign, abs / 1024.0)
    } else {
        format!("{}{}B", sign, abs)
    }
}

fn format_percent(percent: f64) -> String {
    if percent.is_infinite() {
        "new".to_string()
    } else {
        format!("{:+.2}%", percent)
    }
}

fn print_entry(entry: &FileDiff) {
    let path = &entry.metric.path;
    let size = format_bytes(entry.metric.size as i64);
    match entry.diff.change {
        DiffChange::Add => println!("+ {} {}", path, size),
        DiffChange::Remove => println!("- {} {}", path, size),
        DiffChange::Update => println!(
            "~ {}: {} ({} {})",
            path,
            size,
            format_bytes(entry.diff.bytes),
            format_percent(entry.diff.percent)
        ),
        DiffChange::NoChange => {}
    }
    if entry.status == Status::Fail {
        let reasons: Vec<String> = entry.fail_reasons.iter().map(|r| format!("{:?}", r)).collect();
        println!("  ! {} failed: {}", path, reasons.join(", "));
    }
}

fn print_report(report: &DiffReport) {
    let changed = report
        .files
        .iter()
        .chain(report.groups.iter())
        .any(|f| f.diff.change != DiffChange::NoChange || f.status == Status::Fail);
    if !changed {
        println!("No differences.");
    }
    for entry in &report.files {
        print_entry(entry);
    }
    if !report.groups.is_empty() {
        println!("Groups:");
        for entry in &report.groups {
            print_entry(entry);
        }
    }
    println!(
        "Total: {} ({} {}) {:?}",
        format_bytes(report.stats.curr_branch_size as i64),
        format_bytes(report.stats.diff.bytes),
        format_percent(report.stats.diff.percent),
        report.status
    );
}

fn run(args: &Args) -> Result<Status> {
    let current = load_snapshot(&args.current)?;
    let base = match &args.base {
        Some(path) => load_snapshot(path)?,
        None => Snapshot::default(),
    };
    let report = diff_report(&current.files, &current.groups, &base.files, &base.groups);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.quiet {
        print_report(&report);
    }
    Ok(report.status)
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(Status::Pass) => process::exit(0),
        Ok(Status::Fail) => process::exit(1),
        Err(e) => {
            eprintln!("size-compare: {:#}", e);
            process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_bytes_with_units() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(-2048), "-2.00KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00MB");
    }

    #[test]
    fn formats_infinite_percent_as_new() {
        assert_eq!(format_percent(f64::INFINITY), "new");
        assert_eq!(format_percent(33.33), "+33.33%");
        assert_eq!(format_percent(-5.0), "-5.00%");
    }

    #[test]
    fn snapshot_groups_default_to_empty() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"files":[{"pattern":"*.js","path":"a.js","size":1}]}"#).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert!(snapshot.groups.is_empty());
    }

    #[test]
    fn args_parse_positional_and_flags() {
        let args = Args::parse_from(["size-compare", "curr.json", "base.json", "-q"]);
        assert_eq!(args.current, PathBuf::from("curr.json"));
        assert_eq!(args.base, Some(PathBuf::from("base.json")));
        assert!(args.quiet);
        assert!(!args.json);
    }
}
