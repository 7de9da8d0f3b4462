use std::sync::Arc;

use rsreflect_ast::VarDecl;
use rsreflect_diagnostics::Span;

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::evaluator::{ConstantEvaluator, ConstantValue};
use crate::types::ExportType;

/// Prefix reserved for the runtime's own names
pub const RESERVED_PREFIX: &str = "rs";

/// An exported global variable
#[derive(Debug, Clone, PartialEq)]
pub struct ExportVar {
    name: String,
    ty: Arc<ExportType>,
    is_const: bool,
    init: ConstantValue,
    span: Span,
}

impl ExportVar {
    /// Captures `decl` with its resolved type and evaluates its initializer.
    ///
    /// A `const` variable whose initializer cannot be evaluated is an error;
    /// for other variables the value is left [`ConstantValue::Uninit`].
    pub fn new<E>(
        decl: &VarDecl<'_>,
        ty: Arc<ExportType>,
        evaluator: &E,
        config: &ExportConfig,
    ) -> ExportResult<Self>
    where
        E: ConstantEvaluator + ?Sized,
    {
        Self::check_name(&decl.name, config)?;
        let is_const = decl.is_const();

        let init = match &decl.init {
            None if is_const && config.require_const_initializer => {
                return Err(ExportError::MissingInitializer {
                    name: decl.name.clone(),
                });
            }
            None => ConstantValue::Uninit,
            Some(expr) => match evaluator.evaluate(expr).and_then(|value| value.convert_to(&ty)) {
                Ok(value) => value,
                Err(source) if is_const => {
                    return Err(ExportError::Evaluation {
                        name: decl.name.clone(),
                        source,
                    });
                }
                Err(err) => {
                    log::debug!("initializer of '{}' left unevaluated: {}", decl.name, err);
                    ConstantValue::Uninit
                }
            },
        };

        Ok(Self {
            name: decl.name.clone(),
            ty,
            is_const,
            init,
            span: decl.span.clone(),
        })
    }

    /// Rejects names using the reserved prefix unless the config allows them
    pub fn check_name(name: &str, config: &ExportConfig) -> ExportResult<()> {
        if !config.allow_rs_prefix && name.starts_with(RESERVED_PREFIX) {
            return Err(ExportError::ReservedName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn export_type(&self) -> &ExportType {
        &self.ty
    }

    /// The type, shared with every other variable of the same type
    pub fn shared_type(&self) -> &Arc<ExportType> {
        &self.ty
    }

    pub fn is_const(&self) -> bool {
        self.is_const
    }

    pub fn init(&self) -> &ConstantValue {
        &self.init
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
