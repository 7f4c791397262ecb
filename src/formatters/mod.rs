pub mod command;
pub mod imports;
pub mod syntax;

use std::path::Path;

use crate::error::Result;

pub use command::ExternalTool;
pub use imports::UsageImportResolver;
pub use syntax::SyntaxFormatter;

/// Validates and pretty-prints generated Go source
pub trait SourceFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>>;
}

/// Normalizes the import declarations of formatted Go source destined for `path`
pub trait ImportResolver {
    fn resolve_imports(&self, path: &Path, source: &[u8]) -> Result<Vec<u8>>;
}

impl<T: SourceFormatter + ?Sized> SourceFormatter for Box<T> {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>> {
        (**self).format(source)
    }
}

impl<T: ImportResolver + ?Sized> ImportResolver for Box<T> {
    fn resolve_imports(&self, path: &Path, source: &[u8]) -> Result<Vec<u8>> {
        (**self).resolve_imports(path, source)
    }
}
