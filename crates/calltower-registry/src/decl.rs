//! Declaration descriptions accepted by [`SymbolRegistry`](crate::SymbolRegistry).

use calltower_core::{ClassKind, FqName, Name, Param, ScopeId, SymbolFlags, SymbolId, TypeRef};

/// Where a declaration is placed.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    /// Top level of a package.
    Package(FqName),
    /// Member of a classifier.
    Class(SymbolId),
    /// Inside a local scope created with
    /// [`SymbolRegistry::local_scope`](crate::SymbolRegistry::local_scope).
    Local(ScopeId),
}

/// A function declaration.
///
/// ```
/// use calltower_core::{SymbolFlags, SymbolId, TypeRef};
/// use calltower_registry::FunctionDecl;
///
/// let int = TypeRef::Class(SymbolId(7));
/// let decl = FunctionDecl::new("plus")
///     .receiver(int)
///     .param("other", int)
///     .returns(int)
///     .flags(SymbolFlags::OPERATOR);
/// assert_eq!(decl.params.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Name,
    pub receiver: Option<TypeRef>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub flags: SymbolFlags,
}

impl FunctionDecl {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            receiver: None,
            params: Vec::new(),
            return_type: TypeRef::Unknown,
            flags: SymbolFlags::empty(),
        }
    }

    /// Make this an extension function on `ty`.
    pub fn receiver(mut self, ty: TypeRef) -> Self {
        self.receiver = Some(ty);
        self
    }

    pub fn param(mut self, name: impl Into<Name>, ty: TypeRef) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn default_param(mut self, name: impl Into<Name>, ty: TypeRef) -> Self {
        self.params.push(Param::with_default(name, ty));
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn flags(mut self, flags: SymbolFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: Name,
    pub ty: TypeRef,
    pub receiver: Option<TypeRef>,
    pub flags: SymbolFlags,
}

impl PropertyDecl {
    pub fn new(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            receiver: None,
            flags: SymbolFlags::empty(),
        }
    }

    /// Make this an extension property on `ty`.
    pub fn receiver(mut self, ty: TypeRef) -> Self {
        self.receiver = Some(ty);
        self
    }

    pub fn flags(mut self, flags: SymbolFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// A classifier declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Name,
    pub kind: ClassKind,
    pub supertypes: Vec<SymbolId>,
    pub flags: SymbolFlags,
}

impl ClassDecl {
    pub fn class(name: impl Into<Name>) -> Self {
        Self::with_kind(name, ClassKind::Class)
    }

    pub fn interface(name: impl Into<Name>) -> Self {
        Self::with_kind(name, ClassKind::Interface)
    }

    pub fn object(name: impl Into<Name>) -> Self {
        Self::with_kind(name, ClassKind::Object)
    }

    /// A companion object. Kotlin names unnamed companions `Companion`.
    pub fn companion(name: impl Into<Name>) -> Self {
        Self::with_kind(name, ClassKind::CompanionObject)
    }

    fn with_kind(name: impl Into<Name>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supertypes: Vec::new(),
            flags: SymbolFlags::empty(),
        }
    }

    /// Mark as an inner class.
    pub fn inner(mut self) -> Self {
        self.flags |= SymbolFlags::INNER;
        self
    }

    pub fn extends(mut self, supertype: SymbolId) -> Self {
        self.supertypes.push(supertype);
        self
    }
}
