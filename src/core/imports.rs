use std::collections::BTreeSet;

/// Deduplicated, sorted import paths of one output file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportCollector {
    paths: BTreeSet<String>,
}

impl ImportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an import path. Empty paths are ignored; adding twice is a no-op.
    pub fn add(&mut self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        self.paths.insert(path.to_string())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// The `import ( ... )` block, or an empty string when nothing was collected
    pub fn render_block(&self) -> String {
        if self.paths.is_empty() {
            return String::new();
        }
        let mut block = String::from("import (\n");
        for path in &self.paths {
            block.push('\t');
            block.push_str(&super::types::quote(path));
            block.push('\n');
        }
        block.push_str(")\n");
        block
    }
}
