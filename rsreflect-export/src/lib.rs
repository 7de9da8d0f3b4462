//! Declaration export for script reflection.
//!
//! Classifies already-parsed global declarations into the small, closed set
//! of export types consumed by the reflection generator:
//!
//! - [`element_registry`]: compiled-in table of named pixel/packing elements
//! - [`resolver`]: source type descriptor to [`ExportType`] normalization
//! - [`export_var`]: exported global variables with evaluated initializers
//! - [`pragma_recorder`]: `#pragma name(value)` pairs collected during preprocessing
//! - [`context`]: one export pass tying the above together

pub mod config;
pub mod context;
pub mod element_registry;
pub mod error;
pub mod evaluator;
pub mod export_var;
pub mod interner;
pub mod pragma_options;
pub mod pragma_recorder;
pub mod resolver;
pub mod types;

pub use config::{ConsistencyMode, ExportConfig};
pub use context::{is_rs_header_file, ExportContext, ExportSummary};
pub use element_registry::{ElementInfo, ElementRegistry};
pub use error::{ConsistencyFault, EvalError, ExportError, ExportResult, UnsupportedType};
pub use evaluator::{ConstantEvaluator, ConstantValue, ExprEvaluator};
pub use export_var::ExportVar;
pub use interner::ExportTypeInterner;
pub use pragma_options::{resolve_package_name, PragmaOptions};
pub use pragma_recorder::{scan_pragmas, scan_pragmas_with, PragmaEntry, PragmaList, PragmaRecorder};
pub use resolver::TypeResolver;
pub use types::{
    DataKind, DataType, ExportConstantArrayType, ExportField, ExportPointerType,
    ExportPrimitiveType, ExportRecordType, ExportType, ExportVectorType,
};
