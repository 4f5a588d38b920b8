// src/analysis/walk.rs
use crate::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never descended into.
pub const PRUNE_DIRS: &[&str] = &[".git", ".svn", ".hg"];

/// Selects files of a working tree by extension and exclusion pattern.
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
    exclude: Vec<Regex>,
}

impl FileFilter {
    /// `extensions` may carry a leading dot; an empty list accepts every file.
    ///
    /// # Errors
    /// Returns `Regex` if an exclusion pattern is invalid.
    pub fn new(extensions: &[String], exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            exclude,
        })
    }

    /// Tree-relative paths of matching files, sorted.
    ///
    /// # Errors
    /// Returns `Io` if part of the tree cannot be read.
    pub fn collect(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !should_prune(e));

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if self.accepts(rel) {
                paths.push(rel.to_path_buf());
            }
        }
        Ok(paths)
    }

    fn accepts(&self, rel: &Path) -> bool {
        if !self.extensions.is_empty() {
            let ext = rel.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !self.extensions.iter().any(|e| e == ext) {
                return false;
            }
        }
        let normalized = normalize_path(rel);
        !self.exclude.iter().any(|re| re.is_match(&normalized))
    }
}

fn should_prune(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && PRUNE_DIRS.contains(&entry.file_name().to_string_lossy().as_ref())
}

/// Normalizes a path to use forward slashes (cross-platform pattern matching).
fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
