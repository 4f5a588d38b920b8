use crate::types::MetricRequest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Executables for each external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_git")]
    pub git: String,
    #[serde(default = "default_line_counter")]
    pub line_counter: String,
    #[serde(default = "default_build_settings")]
    pub build_settings: String,
    #[serde(default = "default_structure_parser")]
    pub structure_parser: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            git: default_git(),
            line_counter: default_line_counter(),
            build_settings: default_build_settings(),
            structure_parser: default_structure_parser(),
        }
    }
}

fn default_git() -> String { "git".to_string() }
fn default_line_counter() -> String { "cloc".to_string() }
fn default_build_settings() -> String { "xcodebuild".to_string() }
fn default_structure_parser() -> String { "sourcekitten".to_string() }

/// Post-checkout repair steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPolicy {
    #[serde(default = "default_true")]
    pub large_file_pointers: bool,
    #[serde(default = "default_true")]
    pub submodules: bool,
    /// A failed repair fails the whole commit instead of being logged.
    #[serde(default)]
    pub required: bool,
}

impl Default for RepairPolicy {
    fn default() -> Self {
        Self {
            large_file_pointers: true,
            submodules: true,
            required: false,
        }
    }
}

impl RepairPolicy {
    /// No repair at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            large_file_pointers: false,
            submodules: false,
            required: false,
        }
    }
}

const fn default_true() -> bool { true }

/// Contents of a run file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub repository: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub restore_head: bool,
    #[serde(default)]
    pub tools: ToolConfig,
    #[serde(default)]
    pub repair: RepairPolicy,
    #[serde(default, rename = "request")]
    pub requests: Vec<MetricRequest>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repository: None,
            output: None,
            restore_head: true,
            tools: ToolConfig::default(),
            repair: RepairPolicy::default(),
            requests: Vec::new(),
        }
    }
}
