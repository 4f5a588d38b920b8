// src/cli/dispatch.rs
//! Command dispatch logic extracted from the binary.

use super::{
    args::Commands,
    handlers::{handle_inherits, handle_plan, handle_run, InheritsArgs, RunArgs},
};
use crate::exit::StrataExit;
use anyhow::Result;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(command: Commands) -> Result<StrataExit> {
    match command {
        Commands::Run {
            config,
            repo,
            output,
            resume,
            no_restore,
        } => handle_run(&RunArgs {
            config,
            repo,
            output,
            resume,
            restore_head: !no_restore,
        }),
        Commands::Plan { config, repo } => handle_plan(&config, repo.as_deref()),
        Commands::Inherits {
            root,
            base,
            extensions,
            parser,
            json,
        } => handle_inherits(&InheritsArgs {
            root,
            base,
            extensions,
            parser,
            json,
        }),
    }
}
