// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_PATH;

#[derive(Parser)]
#[command(name = "strata", version, about = "Per-commit repository metrics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Debug-level diagnostics on stderr (overridden by STRATA_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every request of a run file and stream one report per commit
    Run {
        /// Run file
        #[arg(long, short, default_value = DEFAULT_PATH)]
        config: PathBuf,
        /// Repository to analyse (overrides the run file)
        #[arg(long)]
        repo: Option<PathBuf>,
        /// JSON-lines output file (overrides the run file; stdout when absent)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Skip commits already present in the output file
        #[arg(long)]
        resume: bool,
        /// Leave the last analysed commit checked out
        #[arg(long)]
        no_restore: bool,
    },
    /// Print the commit order a run would use, without checking anything out
    Plan {
        #[arg(long, short, default_value = DEFAULT_PATH)]
        config: PathBuf,
        #[arg(long)]
        repo: Option<PathBuf>,
    },
    /// List declarations under a directory that inherit from a base type
    Inherits {
        /// Directory to scan
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Base type; `Base<*>` matches any specialisation
        #[arg(long)]
        base: String,
        /// Source extensions to parse
        #[arg(long = "ext", default_values_t = vec!["swift".to_string()])]
        extensions: Vec<String>,
        /// Structure parser executable
        #[arg(long, default_value = "sourcekitten")]
        parser: String,
        #[arg(long)]
        json: bool,
    },
}
