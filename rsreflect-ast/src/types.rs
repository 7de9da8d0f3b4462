use std::cell::OnceCell;
use std::fmt;

use crate::decl::FieldDecl;

/// Builtin scalar types of the script dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Void,
    Bool,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Half,
    Float,
    Double,
}

impl BuiltinKind {
    /// C spelling, as printed in diagnostics
    pub fn c_name(self) -> &'static str {
        match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "_Bool",
            BuiltinKind::Char => "char",
            BuiltinKind::UChar => "unsigned char",
            BuiltinKind::Short => "short",
            BuiltinKind::UShort => "unsigned short",
            BuiltinKind::Int => "int",
            BuiltinKind::UInt => "unsigned int",
            BuiltinKind::Long => "long",
            BuiltinKind::ULong => "unsigned long",
            BuiltinKind::Half => "half",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
        }
    }

    /// Short script spelling (`uchar`, `uint`, ...), used to name vectors
    pub fn short_name(self) -> &'static str {
        match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Char => "char",
            BuiltinKind::UChar => "uchar",
            BuiltinKind::Short => "short",
            BuiltinKind::UShort => "ushort",
            BuiltinKind::Int => "int",
            BuiltinKind::UInt => "uint",
            BuiltinKind::Long => "long",
            BuiltinKind::ULong => "ulong",
            BuiltinKind::Half => "half",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
        }
    }

    pub fn is_floating(self) -> bool {
        matches!(self, BuiltinKind::Half | BuiltinKind::Float | BuiltinKind::Double)
    }
}

/// Type-class tag of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Builtin,
    Pointer,
    ExtVector,
    Typedef,
    Record,
    ConstantArray,
    Function,
}

impl TypeClass {
    pub fn name(self) -> &'static str {
        match self {
            TypeClass::Builtin => "Builtin",
            TypeClass::Pointer => "Pointer",
            TypeClass::ExtVector => "ExtVector",
            TypeClass::Typedef => "Typedef",
            TypeClass::Record => "Record",
            TypeClass::ConstantArray => "ConstantArray",
            TypeClass::Function => "FunctionProto",
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type TypeRef<'a> = &'a Type<'a>;

pub enum TypeKind<'a> {
    Builtin(BuiltinKind),
    Pointer(TypeRef<'a>),
    ExtVector {
        element: TypeRef<'a>,
        count: u32,
    },
    Typedef {
        name: String,
        underlying: TypeRef<'a>,
    },
    /// Struct type; fields are filled in once the definition is complete so
    /// that a record may refer to itself through a pointer.
    Record {
        name: Option<String>,
        fields: OnceCell<Vec<FieldDecl<'a>>>,
    },
    ConstantArray {
        element: TypeRef<'a>,
        size: u64,
    },
    Function {
        result: TypeRef<'a>,
        params: Vec<TypeRef<'a>>,
    },
}

/// A type descriptor together with its canonical form
pub struct Type<'a> {
    kind: TypeKind<'a>,
    // None when the type is its own canonical form
    canonical: Option<TypeRef<'a>>,
}

impl<'a> Type<'a> {
    pub(crate) fn new(kind: TypeKind<'a>, canonical: Option<TypeRef<'a>>) -> Self {
        Self { kind, canonical }
    }

    pub fn kind(&self) -> &TypeKind<'a> {
        &self.kind
    }

    pub fn class(&self) -> TypeClass {
        match self.kind {
            TypeKind::Builtin(_) => TypeClass::Builtin,
            TypeKind::Pointer(_) => TypeClass::Pointer,
            TypeKind::ExtVector { .. } => TypeClass::ExtVector,
            TypeKind::Typedef { .. } => TypeClass::Typedef,
            TypeKind::Record { .. } => TypeClass::Record,
            TypeKind::ConstantArray { .. } => TypeClass::ConstantArray,
            TypeKind::Function { .. } => TypeClass::Function,
        }
    }

    /// Fully alias-resolved form of this type
    pub fn canonical(&'a self) -> TypeRef<'a> {
        self.canonical.unwrap_or(self)
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical.is_none()
    }

    /// Name of the alias if this type is a typedef
    pub fn alias_name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Typedef { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn builtin_kind(&self) -> Option<BuiltinKind> {
        match self.kind {
            TypeKind::Builtin(kind) => Some(kind),
            _ => None,
        }
    }

    /// Fields of a record; empty for other types and incomplete records
    pub fn fields(&self) -> &[FieldDecl<'a>] {
        match &self.kind {
            TypeKind::Record { fields, .. } => fields.get().map(Vec::as_slice).unwrap_or(&[]),
            _ => &[],
        }
    }

    /// Completes a record definition. Returns false if `self` is not a record
    /// or was already completed.
    pub fn complete_record(&self, new_fields: Vec<FieldDecl<'a>>) -> bool {
        match &self.kind {
            TypeKind::Record { fields, .. } => fields.set(new_fields).is_ok(),
            _ => false,
        }
    }

    /// Walks the typedef links starting at this type.
    ///
    /// Yields this type and each underlying type for as long as they are
    /// typedefs; the first non-typedef ends the walk. Only the stored links are
    /// followed, canonical forms are never recomputed.
    pub fn alias_chain(&'a self) -> AliasChain<'a> {
        AliasChain {
            current: Some(self),
        }
    }

    /// C-like spelling of the type
    pub fn display_name(&self) -> String {
        match &self.kind {
            TypeKind::Builtin(kind) => kind.c_name().to_string(),
            TypeKind::Pointer(pointee) => format!("{} *", pointee.display_name()),
            TypeKind::ExtVector { element, count } => format!(
                "{} __attribute__((ext_vector_type({})))",
                element.display_name(),
                count
            ),
            TypeKind::Typedef { name, .. } => name.clone(),
            TypeKind::Record { name, .. } => match name {
                Some(name) => format!("struct {}", name),
                None => "struct (anonymous)".to_string(),
            },
            TypeKind::ConstantArray { element, size } => {
                format!("{} [{}]", element.display_name(), size)
            }
            TypeKind::Function { result, params } => {
                let params: Vec<String> = params.iter().map(|p| p.display_name()).collect();
                format!("{} ({})", result.display_name(), params.join(", "))
            }
        }
    }
}

// Records can reach themselves, so only the spelling is printed
impl fmt::Debug for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({}: {})", self.class(), self.display_name())
    }
}

/// Iterator over the typedef links of a type, see [`Type::alias_chain`]
pub struct AliasChain<'a> {
    current: Option<TypeRef<'a>>,
}

impl<'a> Iterator for AliasChain<'a> {
    type Item = TypeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let ty = self.current.take()?;
        match ty.kind() {
            TypeKind::Typedef { underlying, .. } => {
                self.current = Some(*underlying);
                Some(ty)
            }
            _ => None,
        }
    }
}
