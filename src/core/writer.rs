use std::fs;
use std::path::{Path, PathBuf};

use super::scanner::{OutputFile, OutputFiles};
use crate::error::{MirrorError, Result};
use crate::formatters::{ImportResolver, SourceFormatter};

/// Marker comment placed in every generated file
pub const PROVENANCE: &str = "// Code generated by mirrorgen. DO NOT EDIT.";

/// Persists output files under one directory through the formatter pipeline
pub struct FileWriter<'a> {
    base_dir: PathBuf,
    formatter: &'a dyn SourceFormatter,
    resolver: &'a dyn ImportResolver,
}

impl<'a> FileWriter<'a> {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        formatter: &'a dyn SourceFormatter,
        resolver: &'a dyn ImportResolver,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            formatter,
            resolver,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Unformatted text of `file`: header, provenance, imports, declarations
    pub fn render_source(file: &OutputFile) -> String {
        let mut source = format!("package {}\n\n{}\n\n", file.package_name, PROVENANCE);

        let imports = file.imports.render_block();
        if !imports.is_empty() {
            source.push_str(&imports);
            source.push('\n');
        }

        let declarations: Vec<&str> = file
            .declarations
            .iter()
            .map(|decl| decl.text.as_str())
            .collect();
        source.push_str(&declarations.join("\n"));
        source
    }

    /// Write every non-empty file in name order, returning the written paths
    pub fn write_all(&self, files: &OutputFiles) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(files.len());
        for file in files.values() {
            if let Some(path) = self.write(file)? {
                written.push(path);
            }
        }
        Ok(written)
    }

    /// Write one file; files without declarations are skipped and yield `None`
    pub fn write(&self, file: &OutputFile) -> Result<Option<PathBuf>> {
        if file.is_empty() {
            tracing::debug!(file = %file.name, "no declarations, not writing");
            return Ok(None);
        }
        self.write_source(&file.name, &Self::render_source(file))
            .map(Some)
    }

    /// Format, resolve imports and persist `source` as `<base_dir>/<file_name>`
    pub fn write_source(&self, file_name: &str, source: &str) -> Result<PathBuf> {
        let path = self.base_dir.join(file_name);

        let formatted = self
            .formatter
            .format(source.as_bytes())
            .map_err(|err| match err {
                MirrorError::Format { reason, .. } => MirrorError::Format {
                    file: path.display().to_string(),
                    reason,
                },
                other => other,
            })?;
        let resolved = self.resolver.resolve_imports(&path, &formatted)?;

        fs::create_dir_all(&self.base_dir).map_err(|source| MirrorError::CreateDir {
            path: self.base_dir.clone(),
            source,
        })?;
        fs::write(&path, resolved).map_err(|source| MirrorError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "wrote file");
        Ok(path)
    }
}
