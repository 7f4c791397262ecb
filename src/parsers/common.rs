use std::fs;
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::error::{MirrorError, Result};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language).map_err(|err| MirrorError::Parse {
            path: Default::default(),
            reason: format!("incompatible tree-sitter grammar: {err:?}"),
        })?;
        Ok(Self { parser })
    }

    /// Parser for Go sources
    pub fn go() -> Result<Self> {
        Self::new(tree_sitter_go::language())
    }

    pub fn parse_source(&mut self, source: &str, origin: &Path) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| MirrorError::Parse {
                path: origin.to_path_buf(),
                reason: "parser produced no tree".to_string(),
            })
    }

    /// Read and parse a file, returning the tree together with its source text
    pub fn parse_file(&mut self, file_path: &Path) -> Result<(Tree, String)> {
        let source = fs::read_to_string(file_path).map_err(|source| MirrorError::Load {
            path: file_path.to_path_buf(),
            source,
        })?;
        let tree = self.parse_source(&source, file_path)?;
        Ok((tree, source))
    }
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'a>(node: &TSNode<'a>, kind: &str) -> Option<TSNode<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// First error or missing node in document order
pub fn first_error<'a>(node: &TSNode<'a>) -> Option<TSNode<'a>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<TSNode<'a>> = node.children(&mut cursor).collect();
    children
        .iter()
        .find_map(|child| first_error(child))
        .or(Some(*node))
}
