// src/analysis/build_settings.rs
//! Build settings from `xcodebuild -showBuildSettings -json`.

use crate::error::{Result, StrataError};
use crate::process;
use crate::types::{MissingTarget, Payload};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use tracing::warn;

const TOOL: &str = "build settings tool";

/// Settings of one target as reported by the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSettings {
    pub target: String,
    pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    target: String,
    #[serde(rename = "buildSettings")]
    build_settings: serde_json::Map<String, Value>,
}

/// Decodes the tool's JSON array; non-string values are stringified.
///
/// # Errors
/// Returns `MalformedOutput` if the JSON is not an array of target entries.
pub fn decode(json: &str) -> Result<Vec<TargetSettings>> {
    let raw: Vec<RawEntry> =
        serde_json::from_str(json).map_err(|e| StrataError::malformed(TOOL, e.to_string()))?;
    Ok(raw
        .into_iter()
        .map(|entry| TargetSettings {
            target: entry.target,
            settings: entry
                .build_settings
                .into_iter()
                .map(|(k, v)| (k, stringify(v)))
                .collect(),
        })
        .collect())
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Picks `target` out of decoded entries and keeps only `keys` (all when empty).
///
/// # Errors
/// Returns a fatal `MissingTarget` under [`MissingTarget::Abort`].
pub fn select(
    entries: Vec<TargetSettings>,
    project: &Path,
    target: &str,
    keys: &[String],
    on_missing: MissingTarget,
) -> Result<Payload> {
    let Some(found) = entries.into_iter().find(|e| e.target == target) else {
        return match on_missing {
            MissingTarget::Abort => Err(StrataError::MissingTarget {
                project: project.display().to_string(),
                target: target.to_string(),
                fatal: true,
            }),
            MissingTarget::Empty => {
                warn!(target, project = %project.display(), "target not found, recording empty settings");
                Ok(Payload::BuildSettings {
                    target: target.to_string(),
                    settings: BTreeMap::new(),
                })
            }
        };
    };

    let mut settings = found.settings;
    if !keys.is_empty() {
        settings.retain(|k, _| keys.contains(k));
    }
    Ok(Payload::BuildSettings {
        target: found.target,
        settings,
    })
}

/// Queries every target of `project` for `configuration` and selects `target`.
///
/// # Errors
/// Propagates tool, decode and missing-target errors.
pub fn extract(
    program: &str,
    root: &Path,
    project: &Path,
    target: &str,
    configuration: &str,
    keys: &[String],
    on_missing: MissingTarget,
) -> Result<Payload> {
    let project_path = root.join(project);
    let out = process::run_checked(
        program,
        [
            OsStr::new("-showBuildSettings"),
            OsStr::new("-json"),
            OsStr::new("-alltargets"),
            OsStr::new("-project"),
            project_path.as_os_str(),
            OsStr::new("-configuration"),
            OsStr::new(configuration),
        ],
        root,
    )?;
    select(decode(out.stdout())?, project, target, keys, on_missing)
}
