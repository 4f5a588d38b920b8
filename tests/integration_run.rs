// tests/integration_run.rs
//! Planning and running batches against a repository double.

mod common;

use anyhow::Result;
use common::{swift_files, FakeRepository};
use strata_core::analysis::Toolbox;
use strata_core::config::{RepairPolicy, ToolConfig};
use strata_core::plan;
use strata_core::runner::AnalysisRunner;
use strata_core::types::{CommitReport, Payload, ReportStatus};

fn run_all(
    repo: FakeRepository,
    requests: &[strata_core::types::MetricRequest],
    repair: RepairPolicy,
) -> Result<Vec<CommitReport>> {
    let batch = plan::plan(requests, &repo)?;
    let mut runner =
        AnalysisRunner::new(repo, Toolbox::from_config(ToolConfig::default())).with_repair(repair);
    let mut reports = Vec::new();
    runner.run(batch, |r| reports.push(r))?;
    Ok(reports)
}

fn file_count(report: &CommitReport, request: &str) -> Option<usize> {
    match report.result(request)?.payload()? {
        Payload::FileCount { count, .. } => Some(*count),
        _ => None,
    }
}

#[test]
fn reports_follow_first_seen_commit_order() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .commit("c2", &[("A.swift", ""), ("B.swift", "")])
        .commit("c3", &[]);
    let log = repo.checkouts();

    let reports = run_all(repo, &[swift_files(&["c2", "c1", "c2", "c3"])], RepairPolicy::none())?;

    let commits: Vec<&str> = reports.iter().map(|r| r.commit.as_str()).collect();
    assert_eq!(commits, vec!["c2", "c1", "c3"]);
    assert_eq!(*log.lock().unwrap(), vec!["c2", "c1", "c3"]);
    assert_eq!(file_count(&reports[0], "swift-files"), Some(2));
    assert_eq!(file_count(&reports[1], "swift-files"), Some(1));
    assert_eq!(file_count(&reports[2], "swift-files"), Some(0));
    Ok(())
}

#[test]
fn checkout_failure_degrades_only_that_commit() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .commit("c2", &[("A.swift", "")])
        .commit("c3", &[("A.swift", ""), ("B.swift", "")])
        .failing_checkout("c2");

    let reports = run_all(repo, &[swift_files(&["c1", "c2", "c3"])], RepairPolicy::none())?;

    assert_eq!(reports.len(), 3);
    assert!(!reports[0].is_degraded());
    assert!(reports[1].is_degraded());
    assert!(reports[1].results.is_empty());
    assert!(!reports[2].is_degraded());
    assert_eq!(file_count(&reports[2], "swift-files"), Some(2));
    Ok(())
}

#[test]
fn counts_swift_files_at_head() -> Result<()> {
    let repo = FakeRepository::new().commit(
        "abc123",
        &[
            ("Sources/A.swift", "class A {}"),
            ("Sources/B.swift", "class B {}"),
            ("Sources/Nested/C.swift", "class C {}"),
            ("Resources/Main.storyboard", ""),
            ("README.md", ""),
        ],
    );

    let reports = run_all(repo, &[swift_files(&["HEAD"])], RepairPolicy::none())?;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].commit, "abc123");
    assert!(reports[0].timestamp.is_some());
    assert_eq!(file_count(&reports[0], "swift-files"), Some(3));
    Ok(())
}

#[test]
fn head_is_resolved_once_before_any_checkout() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .commit("c2", &[("A.swift", ""), ("B.swift", "")])
        .head("c2");
    let queries = repo.head_queries();

    let mut other = swift_files(&["c1", "HEAD"]);
    other.name = "again".into();
    let reports = run_all(
        repo,
        &[swift_files(&["HEAD", "c1"]), other],
        RepairPolicy::none(),
    )?;

    // After c2 is checked out and c1 after it, HEAD still means c2.
    let commits: Vec<&str> = reports.iter().map(|r| r.commit.as_str()).collect();
    assert_eq!(commits, vec!["c2", "c1"]);
    assert_eq!(*queries.lock().unwrap(), 1);
    assert_eq!(reports[0].results.len(), 2);
    assert_eq!(file_count(&reports[0], "again"), Some(2));
    Ok(())
}

#[test]
fn unresolvable_head_aborts_before_checkout() {
    let repo = FakeRepository::new().commit("c1", &[]).without_head();
    let log = repo.checkouts();

    let err = plan::plan(&[swift_files(&["c1", "HEAD"])], &repo).unwrap_err();
    assert!(err.is_fatal());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn explicit_hashes_never_query_head() -> Result<()> {
    let repo = FakeRepository::new().commit("c1", &[]).without_head();
    let batch = plan::plan(&[swift_files(&["c1"])], &repo)?;
    assert_eq!(batch.commits(), vec!["c1"]);
    Ok(())
}

#[test]
fn failed_pointer_repair_still_syncs_submodules() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .failing_repair();
    let syncs = repo.submodule_syncs();

    let reports = run_all(repo, &[swift_files(&["c1"])], RepairPolicy::default())?;
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].is_degraded());
    assert_eq!(*syncs.lock().unwrap(), 1);
    Ok(())
}

#[test]
fn required_repair_runs_every_step_before_degrading() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .failing_repair();
    let syncs = repo.submodule_syncs();
    let policy = RepairPolicy {
        required: true,
        ..RepairPolicy::default()
    };

    let reports = run_all(repo, &[swift_files(&["c1"])], policy)?;
    assert!(reports[0].is_degraded());
    assert_eq!(*syncs.lock().unwrap(), 1);
    Ok(())
}

#[test]
fn reset_failure_degrades_with_its_own_reason() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .failing_reset();
    let log = repo.checkouts();

    let reports = run_all(repo, &[swift_files(&["c1"])], RepairPolicy::none())?;
    assert!(matches!(
        &reports[0].status,
        ReportStatus::Degraded { reason } if reason.contains("reset working tree")
    ));
    assert!(log.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn optional_repair_failure_is_only_logged() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .failing_repair();

    let reports = run_all(repo, &[swift_files(&["c1"])], RepairPolicy::default())?;
    assert!(!reports[0].is_degraded());
    assert_eq!(file_count(&reports[0], "swift-files"), Some(1));
    Ok(())
}

#[test]
fn cancellation_stops_before_next_commit() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .commit("c2", &[("A.swift", ""), ("B.swift", "")])
        .commit("c3", &[]);
    let log = repo.checkouts();
    let batch = plan::plan(&[swift_files(&["c1", "c2", "c3"])], &repo)?;

    let mut runner = AnalysisRunner::new(repo, Toolbox::from_config(ToolConfig::default()))
        .with_repair(RepairPolicy::none());
    let token = runner.cancellation_token();
    let mut reports = Vec::new();
    let summary = runner.run(batch, |r| {
        token.cancel();
        reports.push(r);
    })?;

    assert!(summary.cancelled);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(reports.len(), 1);
    assert_eq!(*log.lock().unwrap(), vec!["c1"]);
    Ok(())
}

#[test]
fn cancellation_during_checkout_lets_commit_finish() -> Result<()> {
    let token = strata_core::runner::CancellationToken::new();
    let hook = token.clone();
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .commit("c2", &[("A.swift", ""), ("B.swift", "")])
        .commit("c3", &[])
        .on_checkout(move |commit| {
            if commit == "c2" {
                hook.cancel();
            }
        });
    let batch = plan::plan(&[swift_files(&["c1", "c2", "c3"])], &repo)?;

    let mut runner = AnalysisRunner::new(repo, Toolbox::from_config(ToolConfig::default()))
        .with_repair(RepairPolicy::none())
        .with_cancellation(token);
    let mut reports = Vec::new();
    let summary = runner.run(batch, |r| reports.push(r))?;

    assert_eq!(reports.len(), 2);
    assert_eq!(file_count(&reports[1], "swift-files"), Some(2));
    assert!(summary.cancelled);
    assert_eq!(summary.skipped, 1);
    Ok(())
}

#[test]
fn restore_head_checks_original_commit_back_out() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .commit("c2", &[]);
    let log = repo.checkouts();
    let batch = plan::plan(&[swift_files(&["c1"])], &repo)?;

    let mut runner = AnalysisRunner::new(repo, Toolbox::from_config(ToolConfig::default()))
        .with_repair(RepairPolicy::none())
        .with_restore_head(true);
    runner.run(batch, |_| {})?;

    assert_eq!(*log.lock().unwrap(), vec!["c1", "c2"]);
    Ok(())
}

#[test]
fn restore_head_returns_to_the_original_branch() -> Result<()> {
    let repo = FakeRepository::new()
        .commit("c1", &[("A.swift", "")])
        .commit("c2", &[])
        .on_branch("main");
    let log = repo.checkouts();
    let switches = repo.branch_switches();
    let batch = plan::plan(&[swift_files(&["c1"])], &repo)?;

    let mut runner = AnalysisRunner::new(repo, Toolbox::from_config(ToolConfig::default()))
        .with_repair(RepairPolicy::none())
        .with_restore_head(true);
    runner.run(batch, |_| {})?;

    assert_eq!(*log.lock().unwrap(), vec!["c1"]);
    assert_eq!(*switches.lock().unwrap(), vec!["main"]);
    Ok(())
}

#[test]
fn empty_batch_emits_nothing() -> Result<()> {
    let reports = run_all(FakeRepository::new(), &[], RepairPolicy::none())?;
    assert!(reports.is_empty());
    Ok(())
}
