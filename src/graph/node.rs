// src/graph/node.rs
use serde::Serialize;
use std::path::PathBuf;

/// Index of a node inside its [`DeclarationGraph`](super::DeclarationGraph).
pub type NodeId = usize;

/// What sort of declaration a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Class,
    Struct,
    Enum,
    Protocol,
    Actor,
    Extension,
    /// A rename. Its single supertype is the aliased text.
    Alias,
}

/// One parsed type or alias declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationNode {
    /// Name as looked up during resolution (`Child` for `Parent.Child`).
    pub name: String,
    /// Dotted name including enclosing or extended types.
    pub qualified_name: String,
    /// Tree-relative path of the declaring file.
    pub path: PathBuf,
    /// Supertypes exactly as written, generic arguments included.
    pub supertypes: Vec<String>,
    pub kind: DeclKind,
}

impl DeclarationNode {
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.kind == DeclKind::Alias
    }
}
