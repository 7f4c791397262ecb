use std::path::Path;

use super::SourceFormatter;
use crate::error::{MirrorError, Result};
use crate::parsers::common::{first_error, TreeSitterParser};

/// Built-in formatter: rejects text tree-sitter-go cannot parse cleanly, then
/// normalizes whitespace.
///
/// Not a replacement for `gofmt`; use [`super::ExternalTool`] when the output
/// must match `gofmt` byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxFormatter;

impl SyntaxFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Check that `source` parses without error or missing nodes
    pub fn validate(&self, source: &str) -> Result<()> {
        let mut parser = TreeSitterParser::go()?;
        let tree = parser.parse_source(source, Path::new("<generated>"))?;
        if let Some(node) = first_error(&tree.root_node()) {
            let position = node.start_position();
            let what = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "syntax error".to_string()
            };
            return Err(MirrorError::Format {
                file: "<generated>".to_string(),
                reason: format!("{} at line {}:{}", what, position.row + 1, position.column + 1),
            });
        }
        Ok(())
    }
}

impl SourceFormatter for SyntaxFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(source).map_err(|err| MirrorError::Format {
            file: "<generated>".to_string(),
            reason: format!("generated text is not UTF-8: {err}"),
        })?;
        self.validate(text)?;
        Ok(normalize_whitespace(text).into_bytes())
    }
}

/// Trim trailing whitespace, collapse blank-line runs, drop blank lines right
/// after an opening brace or before a closing one, and end with one newline.
pub fn normalize_whitespace(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        let blank = line.is_empty();
        let previous = lines.last().copied();
        if blank {
            match previous {
                None => continue,
                Some(prev) if prev.is_empty() || prev.ends_with('{') || prev.ends_with('(') => {
                    continue
                }
                _ => {}
            }
        } else if line.trim_start().starts_with(['}', ')']) && previous == Some("") {
            lines.pop();
        }
        lines.push(line);
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
