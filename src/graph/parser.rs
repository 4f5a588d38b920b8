// src/graph/parser.rs
//! Boundary to the external source-structure parser.
//!
//! The parser is an opaque tool that, given a file, prints a JSON tree of
//! declarations. The default adapter speaks the `sourcekitten structure`
//! dialect; anything else can plug in through [`SourceParser`].

use crate::error::{Result, StrataError};
use crate::process;
use serde::Deserialize;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Declaration kinds the graph cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Class,
    Struct,
    Enum,
    Protocol,
    Actor,
    Extension,
    TypeAlias,
    /// Functions, properties and everything else; not registered.
    Other,
}

impl StructureKind {
    #[must_use]
    pub fn from_sourcekit(kind: &str) -> Self {
        let Some(rest) = kind.strip_prefix("source.lang.swift.decl.") else {
            return Self::Other;
        };
        match rest {
            "class" => Self::Class,
            "struct" => Self::Struct,
            "enum" => Self::Enum,
            "protocol" => Self::Protocol,
            "actor" => Self::Actor,
            "typealias" => Self::TypeAlias,
            r if r == "extension" || r.starts_with("extension.") => Self::Extension,
            _ => Self::Other,
        }
    }
}

/// One declaration record as yielded by a parser, nesting preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub kind: StructureKind,
    pub name: String,
    pub inherited: Vec<String>,
    /// For `TypeAlias`: the text on the right of `=`.
    pub alias_target: Option<String>,
    pub children: Vec<Structure>,
}

impl Structure {
    #[must_use]
    pub fn new(kind: StructureKind, name: &str, inherited: &[&str]) -> Self {
        Self {
            kind,
            name: name.to_string(),
            inherited: inherited.iter().map(|s| (*s).to_string()).collect(),
            alias_target: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn alias(name: &str, target: &str) -> Self {
        Self {
            alias_target: Some(target.to_string()),
            ..Self::new(StructureKind::TypeAlias, name, &[])
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Structure>) -> Self {
        self.children = children;
        self
    }
}

/// Turns a source file into declaration records.
pub trait SourceParser: Send + Sync {
    /// # Errors
    /// Returns `Parse` or `MalformedOutput` when the file cannot be interpreted.
    fn parse(&self, path: &Path) -> Result<Vec<Structure>>;
}

/// Adapter for `sourcekitten structure --file <path>`.
#[derive(Debug, Clone)]
pub struct SourceKitten {
    program: String,
}

impl SourceKitten {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SourceParser for SourceKitten {
    fn parse(&self, path: &Path) -> Result<Vec<Structure>> {
        let cwd = path.parent().unwrap_or(Path::new("."));
        let out = process::run_checked(
            &self.program,
            [OsStr::new("structure"), OsStr::new("--file"), path.as_os_str()],
            cwd,
        )?;
        let source = fs::read(path).map_err(|e| StrataError::io(e, path))?;
        decode(out.stdout(), &source, path)
    }
}

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(rename = "key.substructure", default)]
    substructure: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "key.kind")]
    kind: String,
    #[serde(rename = "key.name")]
    name: Option<String>,
    #[serde(rename = "key.inheritedtypes", default)]
    inherited: Vec<RawInherited>,
    #[serde(rename = "key.offset")]
    offset: Option<usize>,
    #[serde(rename = "key.length")]
    length: Option<usize>,
    #[serde(rename = "key.substructure", default)]
    substructure: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawInherited {
    #[serde(rename = "key.name")]
    name: String,
}

/// Decodes structure JSON for the file whose bytes are `source`.
///
/// # Errors
/// Returns `MalformedOutput` if the JSON does not match the schema and
/// `Parse` if a declaration lacks a name or an alias's text cannot be found.
pub fn decode(json: &str, source: &[u8], path: &Path) -> Result<Vec<Structure>> {
    let raw: RawFile = serde_json::from_str(json)
        .map_err(|e| StrataError::malformed("structure parser", e.to_string()))?;
    convert_all(raw.substructure, source, path)
}

fn convert_all(nodes: Vec<RawNode>, source: &[u8], path: &Path) -> Result<Vec<Structure>> {
    let mut out = Vec::new();
    for node in nodes {
        if let Some(s) = convert(node, source, path)? {
            out.push(s);
        }
    }
    Ok(out)
}

fn convert(node: RawNode, source: &[u8], path: &Path) -> Result<Option<Structure>> {
    let kind = StructureKind::from_sourcekit(&node.kind);
    if kind == StructureKind::Other {
        return Ok(None);
    }
    let parse_err = |reason: String| StrataError::Parse {
        path: path.to_path_buf(),
        reason,
    };
    let name = node
        .name
        .ok_or_else(|| parse_err(format!("{} without a name", node.kind)))?;

    let alias_target = if kind == StructureKind::TypeAlias {
        let (offset, length) = node
            .offset
            .zip(node.length)
            .ok_or_else(|| parse_err(format!("typealias {name} has no source range")))?;
        let target = alias_text(source, offset, length)
            .ok_or_else(|| parse_err(format!("typealias {name} has no target")))?;
        debug!(alias = %name, %target, "alias");
        Some(target)
    } else {
        None
    };

    Ok(Some(Structure {
        kind,
        name,
        inherited: node.inherited.into_iter().map(|i| i.name).collect(),
        alias_target,
        children: convert_all(node.substructure, source, path)?,
    }))
}

/// Text after the first `=` in `source[offset..offset + length]`.
fn alias_text(source: &[u8], offset: usize, length: usize) -> Option<String> {
    let end = offset.checked_add(length)?;
    let slice = source.get(offset..end)?;
    let text = std::str::from_utf8(slice).ok()?;
    let (_, target) = text.split_once('=')?;
    let target = target.trim();
    (!target.is_empty()).then(|| target.to_string())
}
