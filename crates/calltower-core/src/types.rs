use std::fmt;

use crate::SymbolId;

/// The static type of a receiver, argument, parameter or property.
///
/// Types are deliberately shallow: the tower only needs to know which
/// member scope a value opens and whether one type can stand in for another.
/// Function types are ordinary classifiers of kind
/// [`ClassKind::FunctionType`](crate::ClassKind::FunctionType).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// An instance of a classifier.
    Class(SymbolId),
    /// The type of an integer literal before narrowing. Carries the
    /// classifier whose members the literal exposes (usually `Int`).
    IntegerLiteral(SymbolId),
    /// A type the caller did not compute. Compatible with everything.
    Unknown,
}

impl TypeRef {
    /// The classifier whose members this type exposes.
    pub fn classifier(&self) -> Option<SymbolId> {
        match self {
            TypeRef::Class(id) | TypeRef::IntegerLiteral(id) => Some(*id),
            TypeRef::Unknown => None,
        }
    }

    pub fn is_integer_literal(&self) -> bool {
        matches!(self, TypeRef::IntegerLiteral(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Class(id) => write!(f, "class {id}"),
            TypeRef::IntegerLiteral(id) => write!(f, "integer literal ({id})"),
            TypeRef::Unknown => f.write_str("<unknown>"),
        }
    }
}
