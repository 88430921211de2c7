//! In-process syntax check using the tree-sitter Python grammar.
//!
//! The grammar is looser than CPython's compiler, so this only backs up the
//! interpreter-based check in [`crate::tools::syntax`] when no interpreter
//! can be run. A parse failure is reported as exactly one `SYNTAX_ERROR`
//! issue pointing at the first broken node.

#[cfg(feature = "tree-sitter-python")]
use tree_sitter::{Node, Parser};

use crate::types::review::Issue;
#[cfg(feature = "tree-sitter-python")]
use crate::types::review::SYNTAX_ERROR;

// Python Ast Parser
#[cfg(feature = "tree-sitter-python")]
pub fn get_tree_sitter_python() -> tree_sitter::Language {
    tree_sitter_python::language()
}

/// Check `code` against the Python grammar.
///
/// Returns `None` for valid source, otherwise a single `SYNTAX_ERROR` issue.
#[cfg(feature = "tree-sitter-python")]
pub fn syntax_check(code: &str) -> Option<Issue> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(get_tree_sitter_python()) {
        tracing::error!("Failed to set language: {:?}", e);
        return None;
    }

    let tree = match parser.parse(code, None) {
        Some(tree) => tree,
        None => {
            tracing::warn!("tree-sitter returned no parse tree");
            return None;
        }
    };

    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let issue = match first_error(root) {
        Some(node) => Issue::new(
            SYNTAX_ERROR,
            describe(node),
            Some(node.start_position().row as u32 + 1),
        ),
        None => Issue::new(SYNTAX_ERROR, "invalid syntax", None),
    };
    Some(issue)
}

#[cfg(not(feature = "tree-sitter-python"))]
pub fn syntax_check(_code: &str) -> Option<Issue> {
    None
}

/// First ERROR or MISSING node in document order.
#[cfg(feature = "tree-sitter-python")]
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

#[cfg(feature = "tree-sitter-python")]
fn describe(node: Node<'_>) -> String {
    if node.is_missing() {
        format!("expected '{}'", node.kind())
    } else {
        "invalid syntax".to_string()
    }
}
