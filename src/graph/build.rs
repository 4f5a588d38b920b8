// src/graph/build.rs
use super::{DeclKind, DeclarationGraph, DeclarationNode, SourceParser, Structure, StructureKind};
use crate::error::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parses `files` (relative to `root`) and flattens every declaration into a graph.
///
/// Files are parsed in parallel but registered in the order given, so
/// first-wins lookups are deterministic.
///
/// # Errors
/// Returns the first parse error encountered.
pub fn build_graph(root: &Path, files: &[PathBuf], parser: &dyn SourceParser) -> Result<DeclarationGraph> {
    let parsed: Vec<(PathBuf, Vec<Structure>)> = files
        .par_iter()
        .map(|rel| parser.parse(&root.join(rel)).map(|s| (rel.clone(), s)))
        .collect::<Result<_>>()?;

    let mut graph = DeclarationGraph::new();
    for (path, structures) in parsed {
        flatten(&mut graph, &structures, None, &path);
    }
    debug!(
        nodes = graph.len(),
        files = files.len(),
        duplicates = graph.duplicate_names().len(),
        "declaration graph built"
    );
    Ok(graph)
}

fn flatten(graph: &mut DeclarationGraph, structures: &[Structure], parent: Option<&str>, path: &Path) {
    for s in structures {
        let Some(kind) = decl_kind(s.kind) else {
            continue;
        };
        let qualified = match parent {
            Some(p) => format!("{p}.{}", s.name),
            None => s.name.clone(),
        };
        let simple = s.name.rsplit('.').next().unwrap_or(&s.name).to_string();

        graph.insert(DeclarationNode {
            name: simple,
            qualified_name: qualified.clone(),
            path: path.to_path_buf(),
            supertypes: supertypes_of(s),
            kind,
        });
        flatten(graph, &s.children, Some(&qualified), path);
    }
}

fn decl_kind(kind: StructureKind) -> Option<DeclKind> {
    match kind {
        StructureKind::Class => Some(DeclKind::Class),
        StructureKind::Struct => Some(DeclKind::Struct),
        StructureKind::Enum => Some(DeclKind::Enum),
        StructureKind::Protocol => Some(DeclKind::Protocol),
        StructureKind::Actor => Some(DeclKind::Actor),
        StructureKind::Extension => Some(DeclKind::Extension),
        StructureKind::TypeAlias => Some(DeclKind::Alias),
        StructureKind::Other => None,
    }
}

/// An alias stands in for its target; a composition `A & B` yields both parts.
fn supertypes_of(s: &Structure) -> Vec<String> {
    match (&s.kind, &s.alias_target) {
        (StructureKind::TypeAlias, Some(target)) => split_composition(target),
        _ => s.inherited.iter().map(|t| t.trim().to_string()).collect(),
    }
}

/// Splits `A & B<C & D>` at top-level `&` only.
fn split_composition(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '&' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
