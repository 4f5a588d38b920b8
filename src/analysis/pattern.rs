// src/analysis/pattern.rs
use super::walk::FileFilter;
use crate::error::{Result, StrataError};
use crate::types::{FileMatches, Payload};
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Counts matches of `pattern` in every selected file.
///
/// Files are read lossily, so binary content never fails the search.
///
/// # Errors
/// Returns `Regex` for an invalid pattern and `Io` if a file cannot be read.
pub fn search(root: &Path, pattern: &str, filter: &FileFilter) -> Result<Payload> {
    let re = Regex::new(pattern)?;
    let files = filter.collect(root)?;

    let counted: Vec<FileMatches> = files
        .par_iter()
        .map(|rel| -> Result<FileMatches> {
            let bytes = fs::read(root.join(rel)).map_err(|e| StrataError::io(e, rel))?;
            let text = String::from_utf8_lossy(&bytes);
            Ok(FileMatches {
                path: rel.clone(),
                matches: re.find_iter(&text).count(),
            })
        })
        .collect::<Result<_>>()?;

    let files: Vec<FileMatches> = counted.into_iter().filter(|f| f.matches > 0).collect();
    Ok(Payload::PatternSearch {
        total: files.iter().map(|f| f.matches).sum(),
        files,
    })
}
