//! Error types for package mirroring
//!
//! Every variant is fatal to a run: the driver stops at the first error and
//! never leaves a partially mirrored package behind on purpose. Declarations
//! and fields that are simply not mirrored are not errors and never show up here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a mirroring run
#[derive(Error, Debug)]
pub enum MirrorError {
    /// The import path does not map to a directory the loader knows about
    #[error("package not found: {import_path}{}", hint.as_ref().map(|h| format!(" ({h})")).unwrap_or_default())]
    PackageNotFound {
        import_path: String,
        hint: Option<String>,
    },

    /// A package directory or `go.mod` could not be read
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input source file could not be parsed
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The syntax formatter rejected generated text
    #[error("failed to format {file}: {reason}")]
    Format { file: String, reason: String },

    /// The import resolver rejected generated text
    #[error("failed to resolve imports for {}: {reason}", path.display())]
    ResolveImports { path: PathBuf, reason: String },

    /// The destination directory could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A generated file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is missing or malformed
    #[error("invalid configuration{}: {reason}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Config {
        path: Option<PathBuf>,
        reason: String,
    },

    /// A declaration with an unsupported underlying type under the `fail` policy
    #[error("unsupported declaration {package}.{name}: underlying type is {kind}")]
    UnsupportedDeclaration {
        package: String,
        name: String,
        kind: String,
    },
}

impl MirrorError {
    /// Create a PackageNotFound error
    pub fn package_not_found(import_path: impl Into<String>) -> Self {
        Self::PackageNotFound {
            import_path: import_path.into(),
            hint: None,
        }
    }

    /// Create a PackageNotFound error with a hint
    pub fn package_not_found_with_hint(
        import_path: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::PackageNotFound {
            import_path: import_path.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a Config error
    pub fn config(path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path,
            reason: reason.into(),
        }
    }
}

/// Result type for mirroring operations
pub type Result<T> = std::result::Result<T, MirrorError>;
