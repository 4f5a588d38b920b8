// src/analysis/line_count.rs
//! Code-line totals from an external `cloc`-style counter.

use crate::error::{Result, StrataError};
use crate::process;
use crate::types::Payload;
use std::ffi::OsString;
use std::path::Path;

const TOOL: &str = "line counter";

/// Runs the counter for `language` under `dir` (relative to `root`).
///
/// # Errors
/// Returns `ToolFailed` if the counter fails and `MalformedOutput` if its
/// table cannot be read.
pub fn count(program: &str, root: &Path, language: &str, dir: &Path) -> Result<Payload> {
    let args: Vec<OsString> = vec![
        "--quiet".into(),
        "--hide-rate".into(),
        format!("--include-lang={language}").into(),
        root.join(dir).into_os_string(),
    ];
    let out = process::run_checked(program, &args, root)?;
    Ok(Payload::LineCount {
        language: language.to_string(),
        lines: parse_table(out.stdout(), language)?,
    })
}

/// Extracts the last numeric column of the row naming `language`.
///
/// An empty report (nothing counted) is zero lines. A table without a row
/// for the language is also zero. Anything not shaped like a table is an error.
///
/// # Errors
/// Returns `MalformedOutput` if the output is not a recognisable table or the
/// language row does not end in a number.
pub fn parse_table(output: &str, language: &str) -> Result<u64> {
    if output.trim().is_empty() {
        return Ok(0);
    }
    let mut saw_header = false;
    for line in output.lines() {
        let line = line.trim();
        if line.starts_with("Language") {
            saw_header = true;
            continue;
        }
        let Some(rest) = line.strip_prefix(language) else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let last = rest.split_whitespace().last().unwrap_or("");
        return last.parse().map_err(|_| {
            StrataError::malformed(TOOL, format!("row for {language} ends in {last:?}"))
        });
    }
    if saw_header {
        Ok(0)
    } else {
        Err(StrataError::malformed(TOOL, "no table header in output"))
    }
}
