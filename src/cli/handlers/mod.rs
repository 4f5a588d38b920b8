// src/cli/handlers/mod.rs
//! Handlers for `run`, `plan` and `inherits`.

use crate::analysis::{FileFilter, Toolbox};
use crate::config::RunConfig;
use crate::error::StrataError;
use crate::exit::StrataExit;
use crate::graph::{build_graph, SourceKitten};
use crate::plan;
use crate::repo::GitRepository;
use crate::runner::AnalysisRunner;
use crate::stream::{JsonLinesWriter, ReportStream};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

mod summary;

pub struct RunArgs {
    pub config: PathBuf,
    pub repo: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub resume: bool,
    pub restore_head: bool,
}

pub struct InheritsArgs {
    pub root: PathBuf,
    pub base: String,
    pub extensions: Vec<String>,
    pub parser: String,
    pub json: bool,
}

#[must_use]
pub fn get_repo_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Handles the run command: plan, execute, stream reports.
///
/// # Errors
/// Returns error on IO failures or an unusable repository.
pub fn handle_run(args: &RunArgs) -> Result<StrataExit> {
    let config = match load_config(&args.config)? {
        Ok(config) => config,
        Err(exit) => return Ok(exit),
    };
    let repo = open_repository(args.repo.as_deref(), &config)?;

    let batch = match plan::plan(&config.requests, &repo) {
        Ok(batch) => batch,
        Err(e) if e.is_fatal() => {
            eprintln!("{} {e}", "Fatal:".red().bold());
            return Ok(StrataExit::Fatal);
        }
        Err(e) => return Err(e.into()),
    };

    let output = args.output.clone().or_else(|| config.output.clone());
    let (mut writer, batch) = match (output, args.resume) {
        (Some(path), true) => {
            let writer = JsonLinesWriter::resume(path)?;
            let skipped = writer.written().len();
            let batch = batch.without(writer.written());
            if skipped > 0 {
                eprintln!(
                    "{} {skipped} commit(s) already in {}",
                    "Resuming:".cyan(),
                    writer.path().display()
                );
            }
            (Some(writer), batch)
        }
        (Some(path), false) => {
            fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            (Some(JsonLinesWriter::new(path)), batch)
        }
        (None, true) => {
            eprintln!("{} --resume needs an output file", "Error:".red());
            return Ok(StrataExit::InvalidInput);
        }
        (None, false) => (None, batch),
    };

    let runner = AnalysisRunner::new(repo, Toolbox::from_config(config.tools.clone()))
        .with_repair(config.repair)
        .with_restore_head(config.restore_head && args.restore_head);

    let stream = ReportStream::spawn(runner, batch);
    let mut failed_results = 0;
    let outcome = stream.drain(|report| -> Result<()> {
        summary::print_commit(&report);
        failed_results += report.results.iter().filter(|r| !r.is_ok()).count();
        match writer.as_mut() {
            Some(w) => {
                w.append(&report)?;
            }
            None => println!("{}", serde_json::to_string(&report)?),
        }
        Ok(())
    })?;

    match outcome {
        Ok(run) => {
            summary::print_run(&run, failed_results);
            Ok(if run.degraded > 0 || failed_results > 0 {
                StrataExit::Degraded
            } else {
                StrataExit::Success
            })
        }
        Err(e) if e.is_fatal() => {
            eprintln!("{} {e}", "Fatal:".red().bold());
            Ok(StrataExit::Fatal)
        }
        Err(e) => Err(e.into()),
    }
}

/// Handles the plan command: prints commit order and the requests at each.
///
/// # Errors
/// Returns error on IO failures or an unusable repository.
pub fn handle_plan(config_path: &Path, repo: Option<&Path>) -> Result<StrataExit> {
    let config = match load_config(config_path)? {
        Ok(config) => config,
        Err(exit) => return Ok(exit),
    };
    let repo = open_repository(repo, &config)?;
    match plan::plan(&config.requests, &repo) {
        Ok(batch) => {
            summary::print_plan(&batch);
            Ok(StrataExit::Success)
        }
        Err(e) if e.is_fatal() => {
            eprintln!("{} {e}", "Fatal:".red().bold());
            Ok(StrataExit::Fatal)
        }
        Err(e) => Err(e.into()),
    }
}

/// Handles the inherits command against the working tree as it is.
///
/// # Errors
/// Returns error if the tree cannot be walked or a file cannot be parsed.
pub fn handle_inherits(args: &InheritsArgs) -> Result<StrataExit> {
    let filter = FileFilter::new(&args.extensions, &[])?;
    let files = filter.collect(&args.root)?;
    let parser = SourceKitten::new(args.parser.clone());
    let graph = build_graph(&args.root, &files, &parser)?;
    let types = graph.descendants_of(&args.base);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&types)?);
    } else {
        summary::print_inherits(&args.base, &types, graph.duplicate_names());
    }
    Ok(StrataExit::Success)
}

/// Loads the run file; a rejected file becomes `InvalidInput` rather than an error.
fn load_config(path: &Path) -> Result<std::result::Result<RunConfig, StrataExit>> {
    match RunConfig::load(path) {
        Ok(config) => Ok(Ok(config)),
        Err(e @ StrataError::Config(_)) => {
            eprintln!("{} {e}", "Error:".red());
            Ok(Err(StrataExit::InvalidInput))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn open_repository(flag: Option<&Path>, config: &RunConfig) -> Result<GitRepository> {
    let root = flag
        .map(Path::to_path_buf)
        .or_else(|| config.repository.clone())
        .unwrap_or_else(get_repo_root);
    let repo = GitRepository::new(&root, config.tools.git.clone());
    anyhow::ensure!(
        repo.is_repository(),
        "{} is not a git repository",
        root.display()
    );
    Ok(repo)
}
