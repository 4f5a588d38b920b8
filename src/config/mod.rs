// src/config/mod.rs
pub mod types;

pub use self::types::{RepairPolicy, RunConfig, ToolConfig};

use crate::error::{Result, StrataError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const DEFAULT_PATH: &str = "strata.toml";

impl RunConfig {
    /// Loads a run file from disk.
    ///
    /// # Errors
    /// Returns error if the file is missing, the TOML is invalid, or
    /// validation fails.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StrataError::io(e, path))?;
        Self::parse(&content).map_err(|e| match e {
            StrataError::Config(msg) => StrataError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parses and validates run-file text.
    ///
    /// # Errors
    /// Returns `Config` on invalid TOML or failed validation.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| StrataError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration.
    ///
    /// # Errors
    /// Returns `Config` for unnamed or duplicate requests and requests with no commits.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for request in &self.requests {
            if request.name.trim().is_empty() {
                return Err(StrataError::Config("request with an empty name".into()));
            }
            if !names.insert(request.name.as_str()) {
                return Err(StrataError::Config(format!(
                    "duplicate request name '{}'",
                    request.name
                )));
            }
            if request.commits.is_empty() {
                return Err(StrataError::Config(format!(
                    "request '{}' lists no commits",
                    request.name
                )));
            }
        }
        Ok(())
    }
}
