// One export pass over the global declarations of a script

use std::path::Path;
use std::sync::Arc;

use rsreflect_ast::{DeclaratorDecl, VarDecl};
use rsreflect_diagnostics::{error_codes, fuzzy, Diagnostic, DiagnosticEngine};
use rsreflect_lexer::MacroTable;

use crate::config::ExportConfig;
use crate::element_registry::ElementRegistry;
use crate::error::ExportResult;
use crate::evaluator::{ConstantEvaluator, ExprEvaluator};
use crate::export_var::ExportVar;
use crate::interner::ExportTypeInterner;
use crate::pragma_options::{resolve_package_name, PragmaOptions};
use crate::pragma_recorder::{self, PragmaList};
use crate::resolver::TypeResolver;
use crate::types::{DataType, ExportType};

/// Headers bundled with the runtime
const RS_HEADER_FILES: &[&str] = &[
    "rs_allocation.rsh",
    "rs_atomic.rsh",
    "rs_cl.rsh",
    "rs_core.rsh",
    "rs_debug.rsh",
    "rs_element.rsh",
    "rs_graphics.rsh",
    "rs_math.rsh",
    "rs_matrix.rsh",
    "rs_mesh.rsh",
    "rs_object.rsh",
    "rs_program.rsh",
    "rs_quaternion.rsh",
    "rs_sampler.rsh",
    "rs_time.rsh",
    "rs_types.rsh",
];

// Minimum Jaro-Winkler similarity for a misspelled element suggestion
const ELEMENT_SUGGESTION_THRESHOLD: f64 = 0.9;

/// True if `path` names one of the runtime's own headers
pub fn is_rs_header_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| RS_HEADER_FILES.contains(&name))
}

/// Outcome of [`ExportContext::process_vars`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub skipped: usize,
    /// Skipped declarations that failed on an element table mismatch
    pub internal_faults: usize,
}

impl ExportSummary {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

/// State of one export pass
pub struct ExportContext {
    config: ExportConfig,
    registry: &'static ElementRegistry,
    evaluator: Box<dyn ConstantEvaluator>,
    pragmas: PragmaList,
    macros: MacroTable,
    interner: ExportTypeInterner,
    vars: Vec<ExportVar>,
    diagnostics: DiagnosticEngine,
}

impl ExportContext {
    pub fn new(config: ExportConfig) -> Self {
        Self::with_registry(config, ElementRegistry::initialize())
    }

    pub fn with_registry(config: ExportConfig, registry: &'static ElementRegistry) -> Self {
        Self {
            config,
            registry,
            evaluator: Box::new(ExprEvaluator::new()),
            pragmas: PragmaList::new(),
            macros: MacroTable::new(),
            interner: ExportTypeInterner::new(),
            vars: Vec::new(),
            diagnostics: DiagnosticEngine::new(),
        }
    }

    /// Replaces the bundled constant evaluator
    pub fn with_evaluator<E: ConstantEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Makes an object-like macro of the front end visible to pragma values
    pub fn define_macro(&mut self, name: &str, replacement: &str) {
        self.macros.define(name, replacement);
    }

    /// Records the `#pragma` directives of a source file
    pub fn scan_pragmas(&mut self, source: &str) -> usize {
        pragma_recorder::scan_pragmas_with(source, &self.macros, &mut self.pragmas)
    }

    pub fn pragmas(&self) -> &PragmaList {
        &self.pragmas
    }

    pub fn pragmas_mut(&mut self) -> &mut PragmaList {
        &mut self.pragmas
    }

    pub fn reflection_options(&self) -> PragmaOptions {
        PragmaOptions::from_pragmas(&self.pragmas)
    }

    /// Package of the generated bindings, config first, then pragma
    pub fn package_name(&self) -> Option<String> {
        resolve_package_name(self.config.package_name.as_deref(), &self.reflection_options())
    }

    /// Resolves the type of `decl` and shares it with equal types exported
    /// earlier in this pass.
    pub fn export_type<'a, D>(&mut self, decl: &D) -> ExportResult<Arc<ExportType>>
    where
        D: DeclaratorDecl<'a> + ?Sized,
    {
        self.warn_unknown_elements(decl);

        let mut resolver = TypeResolver::new(self.registry, self.config.consistency);
        let ty = resolver.resolve_declaration(decl)?;
        Ok(self.interner.intern(ty))
    }

    /// Exports a global variable. On success the variable is appended to
    /// [`ExportContext::vars`].
    pub fn export_var(&mut self, decl: &VarDecl<'_>) -> ExportResult<()> {
        ExportVar::check_name(&decl.name, &self.config)?;
        let ty = self.export_type(decl)?;
        let var = ExportVar::new(decl, ty, self.evaluator.as_ref(), &self.config)?;

        log::debug!("exported '{}' as '{}'", var.name(), var.export_type().name());
        self.vars.push(var);
        Ok(())
    }

    /// Exports every declaration, skipping and reporting the ones that fail
    pub fn process_vars(&mut self, decls: &[VarDecl<'_>]) -> ExportSummary {
        let mut summary = ExportSummary::default();

        for decl in decls {
            match self.export_var(decl) {
                Ok(()) => summary.exported += 1,
                Err(err) => {
                    summary.skipped += 1;
                    if err.is_internal_fault() {
                        summary.internal_faults += 1;
                    }
                    log::warn!("skipping '{}': {}", decl.name, err);
                    self.diagnostics.emit(err.to_diagnostic(decl.span.clone()));
                }
            }
        }

        summary
    }

    pub fn vars(&self) -> &[ExportVar] {
        &self.vars
    }

    pub fn interner(&self) -> &ExportTypeInterner {
        &self.interner
    }

    pub fn diagnostics(&self) -> &DiagnosticEngine {
        &self.diagnostics
    }

    // Aliases spelled like runtime names that match nothing known are
    // likely typos of an element name
    fn warn_unknown_elements<'a, D>(&mut self, decl: &D)
    where
        D: DeclaratorDecl<'a> + ?Sized,
    {
        for alias in decl.declared_type().alias_chain() {
            let Some(name) = alias.alias_name() else {
                continue;
            };
            if !name.starts_with("rs_")
                || self.registry.contains(name)
                || DataType::from_specific_name(name).is_some()
            {
                continue;
            }

            let suggestions = fuzzy::find_similar_names(
                name,
                self.registry.names(),
                ELEMENT_SUGGESTION_THRESHOLD,
                1,
            );
            if let Some(suggestion) = suggestions.first() {
                self.diagnostics.emit(
                    Diagnostic::warning(
                        error_codes::UNKNOWN_ELEMENT_NAME,
                        format!("'{}' is not a registered element", name),
                        decl.span(),
                    )
                    .with_help(format!("did you mean '{}'?", suggestion)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rs_header_files() {
        assert!(is_rs_header_file("rs_types.rsh"));
        assert!(is_rs_header_file("/opt/sdk/include/rs_core.rsh"));
        assert!(!is_rs_header_file("my_types.rsh"));
        assert!(!is_rs_header_file("rs_types.rs"));
    }

    #[test]
    fn test_summary_is_clean() {
        let summary = ExportSummary {
            exported: 2,
            ..ExportSummary::default()
        };
        assert!(summary.is_clean());
    }
}
