use std::cell::OnceCell;

use typed_arena::Arena;

use crate::decl::FieldDecl;
use crate::types::{BuiltinKind, Type, TypeKind, TypeRef};

/// Arena owning every type descriptor of a translation unit.
///
/// Constructors compute the canonical form of the new descriptor right away:
/// a typedef is canonicalized to the canonical form of its underlying type,
/// and composite types built over non-canonical parts get a canonical twin.
pub struct TypeArena<'a> {
    types: Arena<Type<'a>>,
}

impl<'a> TypeArena<'a> {
    pub fn new() -> Self {
        Self {
            types: Arena::new(),
        }
    }

    fn alloc(&'a self, kind: TypeKind<'a>, canonical: Option<TypeRef<'a>>) -> TypeRef<'a> {
        self.types.alloc(Type::new(kind, canonical))
    }

    pub fn builtin(&'a self, kind: BuiltinKind) -> TypeRef<'a> {
        self.alloc(TypeKind::Builtin(kind), None)
    }

    pub fn pointer(&'a self, pointee: TypeRef<'a>) -> TypeRef<'a> {
        let canonical = (!pointee.is_canonical()).then(|| self.pointer(pointee.canonical()));
        self.alloc(TypeKind::Pointer(pointee), canonical)
    }

    pub fn ext_vector(&'a self, element: TypeRef<'a>, count: u32) -> TypeRef<'a> {
        let canonical =
            (!element.is_canonical()).then(|| self.ext_vector(element.canonical(), count));
        self.alloc(TypeKind::ExtVector { element, count }, canonical)
    }

    pub fn typedef(&'a self, name: &str, underlying: TypeRef<'a>) -> TypeRef<'a> {
        self.alloc(
            TypeKind::Typedef {
                name: name.to_string(),
                underlying,
            },
            Some(underlying.canonical()),
        )
    }

    /// Declares a record; complete it with [`Type::complete_record`]
    pub fn record(&'a self, name: Option<&str>) -> TypeRef<'a> {
        self.alloc(
            TypeKind::Record {
                name: name.map(str::to_string),
                fields: OnceCell::new(),
            },
            None,
        )
    }

    /// Declares and defines a record in one step
    pub fn struct_type(&'a self, name: &str, fields: Vec<FieldDecl<'a>>) -> TypeRef<'a> {
        let record = self.record(Some(name));
        record.complete_record(fields);
        record
    }

    pub fn constant_array(&'a self, element: TypeRef<'a>, size: u64) -> TypeRef<'a> {
        let canonical =
            (!element.is_canonical()).then(|| self.constant_array(element.canonical(), size));
        self.alloc(TypeKind::ConstantArray { element, size }, canonical)
    }

    pub fn function(&'a self, result: TypeRef<'a>, params: Vec<TypeRef<'a>>) -> TypeRef<'a> {
        let canonical = (!result.is_canonical() || params.iter().any(|p| !p.is_canonical()))
            .then(|| {
                let params = params.iter().map(|p| p.canonical()).collect();
                self.function(result.canonical(), params)
            });
        self.alloc(TypeKind::Function { result, params }, canonical)
    }
}

impl Default for TypeArena<'_> {
    fn default() -> Self {
        Self::new()
    }
}
