use rsreflect_ast::TypeClass;
use rsreflect_diagnostics::{error_codes, Diagnostic, Span};
use thiserror::Error;

use crate::types::{DataKind, DataType};

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// A type outside the exportable set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("type '{type_name}' is not exportable: {reason}")]
pub struct UnsupportedType {
    /// Display name of the offending type
    pub type_name: String,
    /// Class of its canonical form
    pub class: TypeClass,
    pub reason: &'static str,
}

impl UnsupportedType {
    pub fn new(type_name: String, class: TypeClass, reason: &'static str) -> Self {
        Self {
            type_name,
            class,
            reason,
        }
    }
}

/// The element table and the resolved export type disagree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyFault {
    #[error("element '{element}' is registered with {expected} component(s) but resolves to a {found} type")]
    ClassMismatch {
        element: String,
        expected: u32,
        found: TypeClass,
    },

    #[error("element '{element}' is registered as {expected:?} but resolves to {found:?}")]
    DataTypeMismatch {
        element: String,
        expected: DataType,
        found: DataType,
    },

    #[error("element '{element}' is registered with kind {expected:?} but resolves to {found:?}")]
    DataKindMismatch {
        element: String,
        expected: DataKind,
        found: DataKind,
    },

    #[error("element '{element}' is registered with {expected} components but the vector has {found}")]
    VectorSizeMismatch {
        element: String,
        expected: u32,
        found: u32,
    },
}

/// Constant evaluation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("{what} is not a constant expression")]
    NotConstant { what: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in '{op}'")]
    Overflow { op: String },

    #[error("invalid operand for '{op}': {reason}")]
    InvalidOperand { op: String, reason: &'static str },

    #[error("cannot convert {from} to '{to}'")]
    InvalidConversion { from: String, to: String },
}

/// Errors of a single exported declaration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedType),

    #[error("internal consistency failure: {0}")]
    Consistency(#[from] ConsistencyFault),

    #[error("cannot evaluate the initializer of '{name}': {source}")]
    Evaluation {
        name: String,
        #[source]
        source: EvalError,
    },

    #[error("constant '{name}' has no initializer")]
    MissingInitializer { name: String },

    #[error("'{name}' starts with the reserved prefix 'rs'")]
    ReservedName { name: String },
}

impl ExportError {
    /// True for defects of the compiler rather than of the user's source
    pub fn is_internal_fault(&self) -> bool {
        matches!(self, ExportError::Consistency(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            ExportError::Unsupported(_) => error_codes::UNSUPPORTED_TYPE,
            ExportError::Consistency(_) => error_codes::ELEMENT_MISMATCH,
            ExportError::Evaluation { .. } => error_codes::CONSTANT_EVALUATION,
            ExportError::MissingInitializer { .. } => error_codes::MISSING_INITIALIZER,
            ExportError::ReservedName { .. } => error_codes::RESERVED_NAME,
        }
    }

    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let message = self.to_string();
        match self {
            ExportError::Unsupported(err) => Diagnostic::error(self.code(), message, span)
                .with_note(format!("canonical type class is {}", err.class)),
            ExportError::Consistency(_) => Diagnostic::bug(self.code(), message, span)
                .with_note("the element table disagrees with the resolved type".to_string()),
            ExportError::Evaluation { .. } => Diagnostic::error(self.code(), message, span),
            ExportError::MissingInitializer { .. } => Diagnostic::error(self.code(), message, span)
                .with_help("add an initializer or drop the `const` qualifier".to_string()),
            ExportError::ReservedName { .. } => Diagnostic::error(self.code(), message, span)
                .with_help("rename the declaration".to_string()),
        }
    }
}
