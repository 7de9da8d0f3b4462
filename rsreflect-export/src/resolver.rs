//! Classification of source types into [`ExportType`]s.
//!
//! Two entry points exist. [`TypeResolver::resolve_declaration`] is element
//! aware: it walks the alias chain of the declared type looking for a
//! registered element name and only falls back to the generic path when none
//! is found. [`TypeResolver::resolve_type`] is the generic path, which knows
//! nothing about elements beyond naming.

use rsreflect_ast::{DeclaratorDecl, TypeClass, TypeKind, TypeRef};

use crate::config::ConsistencyMode;
use crate::element_registry::{ElementInfo, ElementRegistry};
use crate::error::{ConsistencyFault, ExportError, ExportResult, UnsupportedType};
use crate::types::{
    DataKind, DataType, ExportConstantArrayType, ExportField, ExportPointerType,
    ExportPrimitiveType, ExportRecordType, ExportType, ExportVectorType,
};

const MIN_VECTOR_SIZE: u32 = 2;
const MAX_VECTOR_SIZE: u32 = 4;

pub struct TypeResolver<'r> {
    registry: &'r ElementRegistry,
    consistency: ConsistencyMode,
    // Addresses of the records whose fields are being resolved
    records_in_progress: Vec<usize>,
}

impl<'r> TypeResolver<'r> {
    pub fn new(registry: &'r ElementRegistry, consistency: ConsistencyMode) -> Self {
        Self {
            registry,
            consistency,
            records_in_progress: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'r ElementRegistry {
        self.registry
    }

    /// Resolver over the process-wide registry, initializing it if needed
    pub fn with_global_registry(consistency: ConsistencyMode) -> TypeResolver<'static> {
        TypeResolver::new(ElementRegistry::initialize(), consistency)
    }

    /// Resolves the declared type of `decl`, preferring a registered element
    /// reached through its aliases.
    pub fn resolve_declaration<'a, D>(&mut self, decl: &D) -> ExportResult<ExportType>
    where
        D: DeclaratorDecl<'a> + ?Sized,
    {
        let ty = decl.declared_type();
        let canonical = ty.canonical();

        // Elements are always builtins or vectors underneath
        if !matches!(canonical.class(), TypeClass::Builtin | TypeClass::ExtVector) {
            return self.resolve_type(ty);
        }

        match self.find_element(ty) {
            Some((alias, info)) => {
                log::debug!("'{}' resolves through element '{}'", decl.name(), alias.display_name());
                self.resolve_element(alias, info)
            }
            None => self.resolve_type(canonical),
        }
    }

    /// First alias on the chain from `ty` toward its canonical type whose
    /// name is a registered element
    pub fn find_element<'a>(&self, ty: TypeRef<'a>) -> Option<(TypeRef<'a>, ElementInfo)> {
        ty.alias_chain().find_map(|alias| {
            let name = alias.alias_name()?;
            log::trace!("alias '{}'", name);
            self.registry.lookup(name).map(|info| (alias, info))
        })
    }

    /// Builds the export type of `ty` using the layout metadata of a
    /// registered element, then checks that both agree.
    pub fn resolve_element<'a>(
        &mut self,
        ty: TypeRef<'a>,
        info: ElementInfo,
    ) -> ExportResult<ExportType> {
        let name = self.normalize_type_name(ty);
        let canonical = ty.canonical();

        let export = match canonical.kind() {
            TypeKind::Builtin(_) | TypeKind::Pointer(_) => {
                let data_type = self.primitive_data_type(ty, &name)?;
                ExportType::Primitive(ExportPrimitiveType {
                    name: name.clone(),
                    data_type,
                    kind: info.kind,
                    normalized: info.normalized,
                })
            }
            TypeKind::ExtVector { element, count } => {
                self.vector_type(ty, name.clone(), *element, *count, info.kind, info.normalized)?
            }
            _ => {
                return Err(unsupported(ty, "only builtin and vector types can be elements"));
            }
        };

        self.check_consistency(verify_element(&name, &info, &export))?;
        Ok(export)
    }

    /// Generic classification of `ty`
    pub fn resolve_type<'a>(&mut self, ty: TypeRef<'a>) -> ExportResult<ExportType> {
        let canonical = ty.canonical();

        match canonical.kind() {
            TypeKind::Builtin(_) => {
                let name = self.normalize_type_name(ty);
                let data_type = self.primitive_data_type(ty, &name)?;
                Ok(ExportType::Primitive(ExportPrimitiveType {
                    name,
                    data_type,
                    kind: DataKind::User,
                    normalized: false,
                }))
            }
            TypeKind::Pointer(pointee) => {
                let name = self.normalize_type_name(ty);
                if let Some(data_type) =
                    DataType::from_specific_name(&name).filter(|dt| dt.is_rs_object())
                {
                    return Ok(ExportType::Primitive(ExportPrimitiveType {
                        name,
                        data_type,
                        kind: DataKind::User,
                        normalized: false,
                    }));
                }
                if pointee.canonical().class() == TypeClass::Function {
                    return Err(unsupported(ty, "function pointers are not exportable"));
                }
                let pointee = self.resolve_type(*pointee)?;
                Ok(ExportType::Pointer(ExportPointerType {
                    name,
                    pointee: Box::new(pointee),
                }))
            }
            TypeKind::ExtVector { element, count } => {
                let name = self.normalize_type_name(ty);
                self.vector_type(ty, name, *element, *count, DataKind::User, false)
            }
            TypeKind::Record { name, .. } => self.record_type(ty, canonical, name.as_deref()),
            TypeKind::ConstantArray { element, size } => {
                let name = self.normalize_type_name(ty);
                let element = self.resolve_type(*element)?;
                Ok(ExportType::ConstantArray(ExportConstantArrayType {
                    name,
                    element: Box::new(element),
                    size: *size,
                }))
            }
            TypeKind::Function { .. } => Err(unsupported(ty, "functions are not exportable")),
            TypeKind::Typedef { .. } => Err(unsupported(ty, "alias without a canonical form")),
        }
    }

    /// Name given to `ty` in the export model.
    ///
    /// The first alias on the chain whose name is script specific (a
    /// registered element or an object handle) names the type; otherwise the
    /// short spelling of its canonical type is used.
    pub fn normalize_type_name<'a>(&self, ty: TypeRef<'a>) -> String {
        let specific = ty
            .alias_chain()
            .filter_map(|alias| alias.alias_name())
            .find(|name| self.is_specific_name(name));
        if let Some(name) = specific {
            return name.to_string();
        }

        let canonical = ty.canonical();
        match canonical.kind() {
            TypeKind::Builtin(kind) => kind.short_name().to_string(),
            TypeKind::Pointer(pointee) => format!("{}*", self.normalize_type_name(*pointee)),
            TypeKind::ExtVector { element, count } => {
                format!("{}{}", self.normalize_type_name(*element), count)
            }
            TypeKind::Record {
                name: Some(name), ..
            } => name.clone(),
            TypeKind::ConstantArray { element, size } => {
                format!("{}[{}]", self.normalize_type_name(*element), size)
            }
            _ => canonical.display_name(),
        }
    }

    pub fn is_specific_name(&self, name: &str) -> bool {
        self.registry.contains(name) || DataType::from_specific_name(name).is_some()
    }

    fn primitive_data_type<'a>(&self, ty: TypeRef<'a>, name: &str) -> ExportResult<DataType> {
        if let Some(data_type) = DataType::from_specific_name(name) {
            return Ok(data_type);
        }
        ty.canonical()
            .builtin_kind()
            .and_then(DataType::from_builtin)
            .ok_or_else(|| unsupported(ty, "type has no primitive representation"))
    }

    fn vector_type<'a>(
        &self,
        ty: TypeRef<'a>,
        name: String,
        element: TypeRef<'a>,
        count: u32,
        kind: DataKind,
        normalized: bool,
    ) -> ExportResult<ExportType> {
        if !(MIN_VECTOR_SIZE..=MAX_VECTOR_SIZE).contains(&count) {
            return Err(unsupported(ty, "vectors must have 2, 3 or 4 components"));
        }
        let data_type = element
            .canonical()
            .builtin_kind()
            .and_then(DataType::from_builtin)
            .ok_or_else(|| unsupported(ty, "vector components must be numeric builtins"))?;

        Ok(ExportType::Vector(ExportVectorType {
            name,
            data_type,
            size: count,
            kind,
            normalized,
        }))
    }

    fn record_type<'a>(
        &mut self,
        ty: TypeRef<'a>,
        record: TypeRef<'a>,
        record_name: Option<&str>,
    ) -> ExportResult<ExportType> {
        let Some(record_name) = record_name else {
            return Err(unsupported(ty, "anonymous records are not exportable"));
        };
        if record.fields().is_empty() {
            return Err(unsupported(ty, "incomplete or empty records are not exportable"));
        }
        let identity = std::ptr::from_ref(record) as usize;
        if self.records_in_progress.contains(&identity) {
            return Err(unsupported(ty, "recursive records are not exportable"));
        }
        log::trace!("resolving fields of record '{}'", record_name);

        self.records_in_progress.push(identity);
        let fields = self.record_fields(record);
        self.records_in_progress.pop();

        Ok(ExportType::Record(ExportRecordType {
            name: self.normalize_type_name(ty),
            fields: fields?,
        }))
    }

    fn record_fields<'a>(&mut self, record: TypeRef<'a>) -> ExportResult<Vec<ExportField>> {
        let mut fields = Vec::with_capacity(record.fields().len());
        for field in record.fields() {
            let ty = self.resolve_declaration(field)?;
            fields.push(ExportField {
                name: field.name.clone(),
                ty,
            });
        }
        Ok(fields)
    }

    fn check_consistency(&self, faults: Vec<ConsistencyFault>) -> ExportResult<()> {
        if self.consistency.is_strict() {
            return match faults.into_iter().next() {
                Some(fault) => Err(ExportError::Consistency(fault)),
                None => Ok(()),
            };
        }
        for fault in faults {
            log::warn!("{}", fault);
        }
        Ok(())
    }
}

// Compares a registered element with the export type derived for it
fn verify_element(name: &str, info: &ElementInfo, export: &ExportType) -> Vec<ConsistencyFault> {
    let mut faults = Vec::new();

    let is_primitive = matches!(export, ExportType::Primitive(_));
    if info.is_primitive() != is_primitive {
        let found = if is_primitive {
            TypeClass::Builtin
        } else {
            TypeClass::ExtVector
        };
        faults.push(ConsistencyFault::ClassMismatch {
            element: name.to_string(),
            expected: info.vector_size,
            found,
        });
    }
    if let Some(found) = export.data_type().filter(|dt| *dt != info.data_type) {
        faults.push(ConsistencyFault::DataTypeMismatch {
            element: name.to_string(),
            expected: info.data_type,
            found,
        });
    }
    if let Some(found) = export.data_kind().filter(|kind| *kind != info.kind) {
        faults.push(ConsistencyFault::DataKindMismatch {
            element: name.to_string(),
            expected: info.kind,
            found,
        });
    }
    if let ExportType::Vector(vector) = export {
        if !info.is_primitive() && vector.size != info.vector_size {
            faults.push(ConsistencyFault::VectorSizeMismatch {
                element: name.to_string(),
                expected: info.vector_size,
                found: vector.size,
            });
        }
    }

    faults
}

fn unsupported<'a>(ty: TypeRef<'a>, reason: &'static str) -> ExportError {
    UnsupportedType::new(ty.display_name(), ty.canonical().class(), reason).into()
}
