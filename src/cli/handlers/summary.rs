// src/cli/handlers/summary.rs
//! Human-readable progress on stderr. Machine output stays on stdout.

use crate::plan::CommitBatch;
use crate::runner::RunSummary;
use crate::types::{CommitReport, Outcome, ReportStatus};
use colored::Colorize;

/// One line per emitted commit, then one per failed result.
pub fn print_commit(report: &CommitReport) {
    let short = short_hash(&report.commit);
    match &report.status {
        ReportStatus::Complete => {
            let failed = report.results.iter().filter(|r| !r.is_ok()).count();
            let status = if failed == 0 {
                "ok".green().to_string()
            } else {
                format!("{failed} failed").yellow().to_string()
            };
            eprintln!(
                "  {} {} ({} results, {status})",
                "✓".green(),
                short.bold(),
                report.results.len()
            );
        }
        ReportStatus::Degraded { reason } => {
            eprintln!("  {} {} degraded: {}", "!".yellow(), short.bold(), reason.dimmed());
        }
    }
    for result in &report.results {
        if let Outcome::Failed { error } = &result.outcome {
            eprintln!("      {} {}: {}", "x".red(), result.request, error);
        }
    }
}

pub fn print_run(run: &RunSummary, failed_results: usize) {
    eprintln!();
    eprintln!("{}", "─".repeat(60).dimmed());
    eprintln!("  {} {}", "Commits:".white(), run.processed);
    if run.degraded > 0 {
        eprintln!("  {} {}", "Degraded:".white(), run.degraded.to_string().yellow());
    }
    if failed_results > 0 {
        eprintln!("  {} {}", "Failed results:".white(), failed_results.to_string().red());
    }
    eprintln!("{}", "─".repeat(60).dimmed());
}

pub fn print_plan(batch: &CommitBatch) {
    if batch.is_empty() {
        println!("{}", "No commits planned.".dimmed());
        return;
    }
    for (idx, entry) in batch.iter().enumerate() {
        let names: Vec<&str> = entry.requests.iter().map(|r| r.name.as_str()).collect();
        println!("{:>3}. {}  {}", idx + 1, entry.commit.bold(), names.join(", ").dimmed());
    }
}

pub fn print_inherits(base: &str, types: &[String], duplicates: &[String]) {
    for name in types {
        println!("  {name}");
    }
    println!(
        "{} {} type(s) inherit from {}",
        "Found".green(),
        types.len(),
        base.bold()
    );
    if !duplicates.is_empty() {
        eprintln!(
            "{} names declared more than once (first wins): {}",
            "Note:".yellow(),
            duplicates.join(", ")
        );
    }
}

fn short_hash(commit: &str) -> &str {
    commit.get(..10).unwrap_or(commit)
}
