// src/analysis/mod.rs
//! Analysis functions: stateless, one request against one checked-out tree.

pub mod build_settings;
pub mod inheritance;
pub mod line_count;
pub mod pattern;
pub mod walk;

pub use walk::FileFilter;

use crate::config::ToolConfig;
use crate::error::Result;
use crate::graph::{SourceKitten, SourceParser};
use crate::types::{Analysis, Payload};
use std::path::Path;
use std::sync::Arc;

/// The external tools analyses may call.
#[derive(Clone)]
pub struct Toolbox {
    pub tools: ToolConfig,
    pub parser: Arc<dyn SourceParser>,
}

impl Toolbox {
    /// Tools from config, with the structure parser it names.
    #[must_use]
    pub fn from_config(tools: ToolConfig) -> Self {
        let parser = Arc::new(SourceKitten::new(tools.structure_parser.clone()));
        Self { tools, parser }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn SourceParser>) -> Self {
        self.parser = parser;
        self
    }
}

impl std::fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolbox").field("tools", &self.tools).finish_non_exhaustive()
    }
}

/// Runs one analysis against the tree at `root`.
///
/// # Errors
/// Returns whatever the specific analysis fails with.
pub fn run(analysis: &Analysis, root: &Path, toolbox: &Toolbox) -> Result<Payload> {
    match analysis {
        Analysis::FileCount { extension, exclude } => {
            let filter = FileFilter::new(std::slice::from_ref(extension), exclude)?;
            let files = filter.collect(root)?;
            Ok(Payload::FileCount {
                count: files.len(),
                files,
            })
        }
        Analysis::LineCount { language, path } => {
            line_count::count(&toolbox.tools.line_counter, root, language, path)
        }
        Analysis::PatternSearch {
            pattern,
            extensions,
            exclude,
        } => pattern::search(root, pattern, &FileFilter::new(extensions, exclude)?),
        Analysis::Inheritance {
            base,
            extensions,
            exclude,
        } => inheritance::count(
            root,
            base,
            &FileFilter::new(extensions, exclude)?,
            toolbox.parser.as_ref(),
        ),
        Analysis::BuildSettings {
            project,
            target,
            configuration,
            keys,
            on_missing_target,
        } => build_settings::extract(
            &toolbox.tools.build_settings,
            root,
            project,
            target,
            configuration,
            keys,
            *on_missing_target,
        ),
    }
}
