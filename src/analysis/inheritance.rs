// src/analysis/inheritance.rs
use super::walk::FileFilter;
use crate::error::Result;
use crate::graph::{build_graph, SourceParser};
use crate::types::Payload;
use std::path::Path;

/// Counts declarations in the tree that descend from `base`.
///
/// # Errors
/// Returns walk or parse errors; one unparseable file fails the request.
pub fn count(root: &Path, base: &str, filter: &FileFilter, parser: &dyn SourceParser) -> Result<Payload> {
    let files = filter.collect(root)?;
    let graph = build_graph(root, &files, parser)?;
    let types = graph.descendants_of(base);
    Ok(Payload::Inheritance {
        count: types.len(),
        types,
    })
}
