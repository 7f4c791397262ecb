//! # MIRRORGEN
//!
//! Mirror the exported data types of a Go package into a new, dependency-free
//! package.
//!
//! A package loader produces the declaration scope of the source package; the
//! scanner keeps exported, data-shaped declarations (structs, named maps, named
//! slices, named basics), strips unexported fields and implementation details,
//! and groups the generated declarations by originating file. The writer then
//! formats each file, settles its imports and persists it.
//!
//! ## Pipeline
//!
//! ```text
//! Driver -> PackageLoader -> DeclarationScanner -> [TypeRenderer, FieldProjector, ImportCollector]
//!        -> FileWriter -> SourceFormatter -> ImportResolver -> disk
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod parsers;

pub use crate::error::{MirrorError, Result};
