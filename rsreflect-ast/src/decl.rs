use rsreflect_diagnostics::Span;

use crate::expr::Expr;
use crate::types::TypeRef;

/// Type qualifiers of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl Qualifiers {
    pub fn constant() -> Self {
        Self {
            is_const: true,
            is_volatile: false,
        }
    }
}

/// A declaration that introduces a name with a declared type
pub trait DeclaratorDecl<'a> {
    fn name(&self) -> &str;

    /// The type as written, aliases included
    fn declared_type(&self) -> TypeRef<'a>;

    fn span(&self) -> Span {
        Span::unknown()
    }
}

/// Global variable declaration
#[derive(Debug, Clone)]
pub struct VarDecl<'a> {
    pub name: String,
    pub ty: TypeRef<'a>,
    pub qualifiers: Qualifiers,
    pub init: Option<Expr>,
    pub span: Span,
}

impl<'a> VarDecl<'a> {
    pub fn new(name: &str, ty: TypeRef<'a>) -> Self {
        Self {
            name: name.to_string(),
            ty,
            qualifiers: Qualifiers::default(),
            init: None,
            span: Span::unknown(),
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_const(&self) -> bool {
        self.qualifiers.is_const
    }
}

impl<'a> DeclaratorDecl<'a> for VarDecl<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> TypeRef<'a> {
        self.ty
    }

    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Field of a record
#[derive(Debug, Clone)]
pub struct FieldDecl<'a> {
    pub name: String,
    pub ty: TypeRef<'a>,
}

impl<'a> FieldDecl<'a> {
    pub fn new(name: &str, ty: TypeRef<'a>) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

impl<'a> DeclaratorDecl<'a> for FieldDecl<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> TypeRef<'a> {
        self.ty
    }
}
