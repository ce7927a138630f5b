//! Scope handles and the provider contract the resolver queries.

use std::fmt;

use crate::{FqName, Name, Symbol, SymbolId, TypeRef};

/// Index of a lexical scope owned by a provider (package, import or local scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A queryable source of named declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRef {
    /// Package, import or local scope.
    Lexical(ScopeId),
    /// Instance members of a classifier, including inherited ones.
    Members(SymbolId),
    /// Static members and nested classifiers of a classifier.
    Static(SymbolId),
    /// What a classifier name used as a qualifier exposes: its static scope
    /// plus the members of its companion object.
    Qualifier(SymbolId),
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeRef::Lexical(id) => write!(f, "lexical{id}"),
            ScopeRef::Members(id) => write!(f, "members({id})"),
            ScopeRef::Static(id) => write!(f, "static({id})"),
            ScopeRef::Qualifier(id) => write!(f, "qualifier({id})"),
        }
    }
}

/// Declaration kind a level is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Properties,
    /// Functions and constructors.
    Functions,
    /// Object declarations usable as values.
    Objects,
}

/// Read-only access to declarations and scopes.
///
/// Implementations must be side-effect free: the resolver may query the same
/// scope many times during one resolution.
pub trait SymbolProvider {
    /// Look up a symbol by id.
    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// Feed every declaration of `scope` named `name` that matches `token`
    /// to `processor`, in declaration order.
    fn process_by_name(
        &self,
        scope: ScopeRef,
        name: &Name,
        token: Token,
        processor: &mut dyn FnMut(SymbolId),
    );

    /// Member scope opened by a value of type `ty`.
    fn type_scope(&self, ty: &TypeRef) -> Option<ScopeRef>;

    /// Companion object declared in `class`.
    fn companion_object(&self, class: SymbolId) -> Option<SymbolId>;

    /// Top-level scope of a package, if the package exists.
    fn package_scope(&self, package: &FqName) -> Option<ScopeRef>;

    /// Whether a value of type `sub` can be used where `sup` is expected.
    fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool;

    /// Whether `ty` is a function type with a receiver (`A.() -> R`).
    fn is_extension_function_type(&self, ty: &TypeRef) -> bool;
}
