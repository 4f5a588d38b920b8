// src/graph/resolver.rs
//! Transitive "does X descend from B" queries over a [`DeclarationGraph`].
//!
//! A declared supertype satisfies a target directly when it is the target
//! text, ends in `.target`, or (for a `Base<*>` target) is any generic
//! instantiation of `Base`. Otherwise each supertype is stripped of generic
//! arguments, looked up by name, and searched in turn. Aliases are ordinary
//! nodes whose only supertype is the aliased text, so chains of aliases are
//! followed for free.

use super::{DeclarationGraph, NodeId};
use std::collections::HashSet;

const WILDCARD: &str = "<*>";

/// Precomputed forms of the target base name.
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    target: String,
    qualified_suffix: String,
    generic_prefix: Option<String>,
    qualified_generic: Option<String>,
}

impl TargetMatcher {
    #[must_use]
    pub fn new(target: &str) -> Self {
        let target = target.trim();
        let base = target.strip_suffix(WILDCARD);
        Self {
            target: target.to_string(),
            qualified_suffix: format!(".{target}"),
            generic_prefix: base.map(|b| format!("{b}<")),
            qualified_generic: base.map(|b| format!(".{b}<")),
        }
    }

    /// Whether one written supertype satisfies the target without recursion.
    #[must_use]
    pub fn matches(&self, declared: &str) -> bool {
        let declared = declared.trim();
        if declared == self.target || declared.ends_with(&self.qualified_suffix) {
            return true;
        }
        match (&self.generic_prefix, &self.qualified_generic) {
            (Some(prefix), Some(qualified)) => {
                declared.starts_with(prefix.as_str()) || declared.contains(qualified.as_str())
            }
            _ => false,
        }
    }
}

/// Strips generic arguments: `Name<T>` becomes `Name`.
#[must_use]
pub fn strip_generics(declared: &str) -> &str {
    declared
        .split_once('<')
        .map_or(declared, |(head, _)| head)
        .trim()
}

/// Returns true if `node` inherits from `target`, directly or transitively.
///
/// Every node is expanded at most once, so cyclic declarations terminate and
/// resolve to `false` unless a direct match exists somewhere on the cycle.
#[must_use]
pub fn is_inherited(graph: &DeclarationGraph, node: NodeId, target: &str) -> bool {
    let matcher = TargetMatcher::new(target);
    inherits_with(graph, node, &matcher)
}

pub(crate) fn inherits_with(graph: &DeclarationGraph, node: NodeId, matcher: &TargetMatcher) -> bool {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![node];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(current) = graph.node(id) else {
            continue;
        };
        if current.supertypes.iter().any(|s| matcher.matches(s)) {
            return true;
        }
        for declared in &current.supertypes {
            if let Some(parent) = graph.lookup(strip_generics(declared)) {
                if !visited.contains(&parent) {
                    stack.push(parent);
                }
            }
        }
    }
    false
}
