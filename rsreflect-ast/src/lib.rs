//! Declarations, type descriptors and initializer expressions handed over by
//! the front end.
//!
//! Type descriptors live in a [`TypeArena`] and are only ever borrowed; every
//! descriptor knows its canonical (alias-stripped) form, computed once when
//! the descriptor is created.

mod arena;
mod decl;
mod expr;
mod types;

pub use arena::TypeArena;
pub use decl::{DeclaratorDecl, FieldDecl, Qualifiers, VarDecl};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use types::{AliasChain, BuiltinKind, Type, TypeClass, TypeKind, TypeRef};
