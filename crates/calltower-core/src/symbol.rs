//! Declarations as the tower sees them.
//!
//! A [`Symbol`] is the provider's answer to "what is declared under this
//! name". The resolver reads symbols but never creates or mutates them.

use bitflags::bitflags;

use crate::{Name, SymbolId, TypeRef};

bitflags! {
    /// Modifiers relevant to reachability and applicability.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u16 {
        /// Static member (reached through the static scope, never through an instance).
        const STATIC = 1 << 0;
        /// Inner class, or constructor of one. Inner classes keep the outer instance reachable.
        const INNER = 1 << 1;
        /// Declared with the `operator` modifier.
        const OPERATOR = 1 << 2;
        /// Synthesized by the provider rather than written in source.
        const SYNTHETIC = 1 << 3;
        /// Present but not callable from user code.
        const HIDDEN = 1 << 4;
        /// Last parameter accepts any number of arguments.
        const VARARG = 1 << 5;
    }
}

/// Kinds of classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    CompanionObject,
    /// Synthesized classifier of a function type. Extension function types
    /// take their receiver as the first `invoke` parameter.
    FunctionType { is_extension: bool },
}

impl ClassKind {
    /// Whether a classifier of this kind is itself a value (`object Foo`).
    pub fn is_object(&self) -> bool {
        matches!(self, ClassKind::Object | ClassKind::CompanionObject)
    }
}

/// What a symbol declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Property,
    Constructor,
    Class(ClassKind),
}

/// A value parameter of a function or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Name,
    pub ty: TypeRef,
    pub has_default: bool,
}

impl Param {
    pub fn new(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
        }
    }

    pub fn with_default(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: true,
        }
    }
}

/// A resolved declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: Name,
    pub kind: SymbolKind,
    pub flags: SymbolFlags,
    /// Containing classifier for members, constructors and nested classifiers.
    pub owner: Option<SymbolId>,
    /// Extension receiver type, for extension functions and properties.
    pub receiver_type: Option<TypeRef>,
    pub params: Vec<Param>,
    /// Property type, function return type, or the classifier's own type.
    pub return_type: TypeRef,
}

impl Symbol {
    pub fn is_static(&self) -> bool {
        self.flags.contains(SymbolFlags::STATIC)
    }

    pub fn is_inner(&self) -> bool {
        self.flags.contains(SymbolFlags::INNER)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(SymbolFlags::HIDDEN)
    }

    pub fn is_synthetic(&self) -> bool {
        self.flags.contains(SymbolFlags::SYNTHETIC)
    }

    pub fn is_vararg(&self) -> bool {
        self.flags.contains(SymbolFlags::VARARG)
    }

    /// Functions, properties and constructors.
    pub fn is_callable(&self) -> bool {
        !matches!(self.kind, SymbolKind::Class(_))
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, SymbolKind::Constructor)
    }

    pub fn is_property(&self) -> bool {
        matches!(self.kind, SymbolKind::Property)
    }

    /// Extension declarations carry a receiver type.
    pub fn has_extension_receiver(&self) -> bool {
        self.receiver_type.is_some()
    }

    pub fn class_kind(&self) -> Option<ClassKind> {
        match self.kind {
            SymbolKind::Class(kind) => Some(kind),
            _ => None,
        }
    }

    /// Members only reachable through the static scope: statics and
    /// constructors of non-inner classes.
    pub fn is_static_like(&self) -> bool {
        self.is_static() || (self.is_constructor() && !self.is_inner())
    }

    /// Number of parameters that must be supplied by the caller.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.has_default).count()
    }
}
