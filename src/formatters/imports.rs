use std::collections::HashSet;
use std::path::Path;
use tree_sitter::Node as TSNode;

use super::syntax::normalize_whitespace;
use super::ImportResolver;
use crate::error::{MirrorError, Result};
use crate::parsers::common::{extract_text, find_child_by_kind, TreeSitterParser};
use crate::parsers::go::default_package_name;

/// Built-in import resolver: removes imports nothing in the file refers to.
///
/// It never adds an import. Anything a declaration needs has to be in the
/// file's collected import set already; plug in `goimports` through
/// [`ExternalTool`](super::ExternalTool) to have missing ones filled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageImportResolver;

struct ImportSpec {
    text: String,
    local_name: String,
}

impl UsageImportResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ImportResolver for UsageImportResolver {
    fn resolve_imports(&self, path: &Path, source: &[u8]) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(source).map_err(|err| MirrorError::ResolveImports {
            path: path.to_path_buf(),
            reason: format!("source is not UTF-8: {err}"),
        })?;
        let mut parser = TreeSitterParser::go()?;
        let tree = parser.parse_source(text, path)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(MirrorError::ResolveImports {
                path: path.to_path_buf(),
                reason: "source does not parse".to_string(),
            });
        }

        let mut used = HashSet::new();
        collect_qualifiers(&root, source, &mut used);

        let mut cursor = root.walk();
        let declarations: Vec<TSNode> = root
            .children(&mut cursor)
            .filter(|child| child.kind() == "import_declaration")
            .collect();
        if declarations.is_empty() {
            return Ok(source.to_vec());
        }

        let specs: Vec<ImportSpec> = declarations
            .iter()
            .flat_map(|decl| import_specs(decl, source))
            .collect();
        let kept: Vec<&ImportSpec> = specs
            .iter()
            .filter(|spec| {
                spec.local_name == "_" || spec.local_name == "." || used.contains(&spec.local_name)
            })
            .collect();
        if kept.len() == specs.len() {
            return Ok(source.to_vec());
        }

        for spec in specs.iter().filter(|spec| !kept.iter().any(|k| k.text == spec.text)) {
            tracing::debug!(file = %path.display(), import = %spec.text, "removing unused import");
        }

        let mut block = String::new();
        if !kept.is_empty() {
            block.push_str("import (\n");
            for spec in &kept {
                block.push('\t');
                block.push_str(&spec.text);
                block.push('\n');
            }
            block.push(')');
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (i, decl) in declarations.iter().enumerate() {
            out.push_str(&text[last..decl.start_byte()]);
            if i == 0 {
                out.push_str(&block);
            }
            last = decl.end_byte();
        }
        out.push_str(&text[last..]);

        Ok(normalize_whitespace(&out).into_bytes())
    }
}

fn import_specs(declaration: &TSNode, source: &[u8]) -> Vec<ImportSpec> {
    let mut specs = Vec::new();
    let list = find_child_by_kind(declaration, "import_spec_list");
    let parent = list.as_ref().unwrap_or(declaration);
    let mut cursor = parent.walk();
    for spec in parent.children(&mut cursor) {
        if spec.kind() != "import_spec" {
            continue;
        }
        let path = spec
            .child_by_field_name("path")
            .map(|node| extract_text(&node, source).trim_matches(|c| c == '"' || c == '`'))
            .unwrap_or_default();
        let local_name = match spec.child_by_field_name("name") {
            Some(name) => extract_text(&name, source).to_string(),
            None => default_package_name(path),
        };
        specs.push(ImportSpec {
            text: extract_text(&spec, source).to_string(),
            local_name,
        });
    }
    specs
}

fn collect_qualifiers(node: &TSNode, source: &[u8], used: &mut HashSet<String>) {
    match node.kind() {
        "qualified_type" => {
            if let Some(package) = node.child_by_field_name("package") {
                used.insert(extract_text(&package, source).to_string());
            }
        }
        "selector_expression" => {
            if let Some(operand) = node.child_by_field_name("operand") {
                if operand.kind() == "identifier" {
                    used.insert(extract_text(&operand, source).to_string());
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_qualifiers(&child, source, used);
    }
}
