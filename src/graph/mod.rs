// src/graph/mod.rs
//! Declaration graph: parsed type declarations and inheritance queries.

mod build;
mod node;
pub mod parser;
pub mod resolver;

pub use build::build_graph;
pub use node::{DeclKind, DeclarationNode, NodeId};
pub use parser::{SourceKitten, SourceParser, Structure, StructureKind};
pub use resolver::{is_inherited, TargetMatcher};

use std::collections::HashMap;
use tracing::debug;

/// Arena of declaration nodes with name indexes.
///
/// When several declarations share a simple name the first one inserted wins
/// every lookup; later ones stay in the arena and are listed by
/// [`DeclarationGraph::duplicate_names`].
#[derive(Debug, Clone, Default)]
pub struct DeclarationGraph {
    nodes: Vec<DeclarationNode>,
    by_name: HashMap<String, NodeId>,
    by_qualified: HashMap<String, NodeId>,
    duplicates: Vec<String>,
}

impl DeclarationGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its id.
    pub fn insert(&mut self, node: DeclarationNode) -> NodeId {
        let id = self.nodes.len();
        if self.by_name.contains_key(&node.name) {
            debug!(name = %node.name, path = %node.path.display(), "duplicate declaration name, keeping first");
            if !self.duplicates.contains(&node.name) {
                self.duplicates.push(node.name.clone());
            }
        } else {
            self.by_name.insert(node.name.clone(), id);
        }
        self.by_qualified
            .entry(node.qualified_name.clone())
            .or_insert(id);
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&DeclarationNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn nodes(&self) -> &[DeclarationNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the node a written type name refers to.
    ///
    /// Tries the simple-name index, then the qualified index, then the last
    /// dotted segment (so `Module.Base` finds `Base`).
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        if let Some(&id) = self.by_name.get(name) {
            return Some(id);
        }
        if !name.contains('.') {
            return None;
        }
        if let Some(&id) = self.by_qualified.get(name) {
            return Some(id);
        }
        let last = name.rsplit('.').next()?;
        self.by_name.get(last).copied()
    }

    /// Simple names declared more than once, in first-seen order.
    #[must_use]
    pub fn duplicate_names(&self) -> &[String] {
        &self.duplicates
    }

    /// Qualified names of every non-alias declaration inheriting from `target`.
    ///
    /// Names are distinct and in registration order; an extension and the
    /// type it extends count once.
    #[must_use]
    pub fn descendants_of(&self, target: &str) -> Vec<String> {
        let matcher = TargetMatcher::new(target);
        let mut seen = std::collections::HashSet::new();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_alias())
            .filter(|(id, _)| resolver::inherits_with(self, *id, &matcher))
            .filter_map(|(_, n)| {
                seen.insert(n.qualified_name.as_str())
                    .then(|| n.qualified_name.clone())
            })
            .collect()
    }
}
