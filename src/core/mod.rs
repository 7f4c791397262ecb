pub mod driver;
pub mod imports;
pub mod marshaler;
pub mod policy;
pub mod projector;
pub mod render;
pub mod scanner;
pub mod types;
pub mod writer;

pub use driver::{Driver, MarshalerOptions, PackageSummary, RunSummary};
pub use imports::ImportCollector;
pub use policy::{CleaningPolicy, IdentityPolicy, PackageRewrite, RulePolicy};
pub use projector::{FieldProjection, FieldProjector};
pub use render::TypeRenderer;
pub use scanner::{Declaration, DeclarationScanner, OutputFile, OutputFiles, UnsupportedPolicy};
pub use types::{Field, Package, Scope, StructType, Symbol, TypeRef};
pub use writer::FileWriter;
