//! Receiver model.
//!
//! ```text
//! ExplicitReceiver  - written at the call site: `a.f()` or `pkg.Class.f()`
//! ImplicitReceiver  - an enclosing `this`, innermost first
//! ReceiverValue     - the receiver a candidate was reached through
//! ```

use std::fmt;

use calltower_core::{FqName, ScopeRef, SymbolId, SymbolProvider, TypeRef};

// ============================================================================
// Explicit Receivers
// ============================================================================

/// A receiver written at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplicitReceiver {
    /// A value: `expr.f()`.
    Expression(ExpressionReceiver),
    /// A package or classifier name: `kotlin.io.println()`, `Outer.Nested()`.
    Qualifier(QualifierReceiver),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionReceiver {
    pub ty: TypeRef,
    pub origin: ReceiverOrigin,
}

/// Where an expression receiver comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverOrigin {
    /// Written by the caller.
    Expression,
    /// Read of a property whose value is being invoked.
    PropertyRead(Box<PropertyRead>),
}

/// Synthesized receiver of an invoke call: the property read `f` in `f()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRead {
    pub property: SymbolId,
    pub dispatch_receiver: Option<ReceiverValue>,
    /// Absent when the extension receiver is passed to `invoke` as its first
    /// argument instead.
    pub extension_receiver: Option<ReceiverValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifierReceiver {
    pub package: FqName,
    /// `None` when the qualifier names a package only.
    pub class: Option<SymbolId>,
    /// Type of the value the qualifier denotes: the object itself or the
    /// classifier's companion.
    pub value_type: Option<TypeRef>,
}

impl ExplicitReceiver {
    /// A plain expression of type `ty`.
    pub fn expression(ty: TypeRef) -> Self {
        ExplicitReceiver::Expression(ExpressionReceiver {
            ty,
            origin: ReceiverOrigin::Expression,
        })
    }

    /// A qualifier naming only a package.
    pub fn package(package: impl Into<FqName>) -> Self {
        ExplicitReceiver::Qualifier(QualifierReceiver {
            package: package.into(),
            class: None,
            value_type: None,
        })
    }

    /// A qualifier naming a classifier.
    pub fn class_qualifier(
        provider: &dyn SymbolProvider,
        package: impl Into<FqName>,
        class: SymbolId,
    ) -> Self {
        let is_object = provider
            .symbol(class)
            .and_then(|s| s.class_kind())
            .is_some_and(|kind| kind.is_object());
        let value_type = if is_object {
            Some(TypeRef::Class(class))
        } else {
            provider.companion_object(class).map(TypeRef::Class)
        };
        ExplicitReceiver::Qualifier(QualifierReceiver {
            package: package.into(),
            class: Some(class),
            value_type,
        })
    }

    /// Type of the receiver value, if it denotes one.
    pub fn ty(&self) -> Option<TypeRef> {
        match self {
            ExplicitReceiver::Expression(e) => Some(e.ty),
            ExplicitReceiver::Qualifier(q) => q.value_type,
        }
    }

    pub fn is_qualifier(&self) -> bool {
        matches!(self, ExplicitReceiver::Qualifier(_))
    }

    /// The package named by a qualifier without a classifier part.
    pub fn package_only(&self) -> Option<&FqName> {
        match self {
            ExplicitReceiver::Qualifier(QualifierReceiver {
                package,
                class: None,
                ..
            }) => Some(package),
            _ => None,
        }
    }

    pub fn is_integer_literal(&self) -> bool {
        matches!(self, ExplicitReceiver::Expression(e) if e.ty.is_integer_literal())
    }
}

// ============================================================================
// Implicit Receivers
// ============================================================================

/// Position of an implicit receiver in the chain, innermost first.
///
/// Receivers are compared by position, never by value: two enclosing
/// instances of the same class are still different receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImplicitReceiverId(pub usize);

impl fmt::Display for ImplicitReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "this@{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplicitReceiverKind {
    /// `this` of an enclosing class body.
    Dispatch { class: SymbolId, is_inner: bool },
    /// `this` of an enclosing extension function or lambda with receiver.
    Extension { function: SymbolId },
}

/// An enclosing receiver usable without being written.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplicitReceiver {
    pub kind: ImplicitReceiverKind,
    pub ty: TypeRef,
    /// Statics and nested classifiers reachable from inside the body.
    pub static_scope: Option<ScopeRef>,
    pub companion_scopes: Vec<ScopeRef>,
}

impl ImplicitReceiver {
    /// The `this` of a class body.
    pub fn for_class(provider: &dyn SymbolProvider, class: SymbolId) -> Self {
        let is_inner = provider.symbol(class).is_some_and(|s| s.is_inner());
        Self {
            kind: ImplicitReceiverKind::Dispatch { class, is_inner },
            ty: TypeRef::Class(class),
            static_scope: Some(ScopeRef::Static(class)),
            companion_scopes: provider
                .companion_object(class)
                .map(ScopeRef::Members)
                .into_iter()
                .collect(),
        }
    }

    /// The receiver of an enclosing extension function or lambda.
    pub fn extension(function: SymbolId, ty: TypeRef) -> Self {
        Self {
            kind: ImplicitReceiverKind::Extension { function },
            ty,
            static_scope: None,
            companion_scopes: Vec::new(),
        }
    }

    pub fn is_dispatch(&self) -> bool {
        matches!(self.kind, ImplicitReceiverKind::Dispatch { .. })
    }

    /// A non-inner class body cannot reach the instances of outer classes.
    pub fn blocks_outer_dispatch(&self) -> bool {
        matches!(
            self.kind,
            ImplicitReceiverKind::Dispatch {
                is_inner: false,
                ..
            }
        )
    }
}

// ============================================================================
// Receiver Values
// ============================================================================

/// The receiver a candidate was reached through.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverValue {
    Explicit(ExplicitReceiver),
    Implicit {
        id: ImplicitReceiverId,
        ty: TypeRef,
    },
    /// An object declaration owning the member.
    Object(SymbolId),
}

impl ReceiverValue {
    pub fn ty(&self) -> Option<TypeRef> {
        match self {
            ReceiverValue::Explicit(receiver) => receiver.ty(),
            ReceiverValue::Implicit { ty, .. } => Some(*ty),
            ReceiverValue::Object(id) => Some(TypeRef::Class(*id)),
        }
    }

    pub fn implicit_id(&self) -> Option<ImplicitReceiverId> {
        match self {
            ReceiverValue::Implicit { id, .. } => Some(*id),
            _ => None,
        }
    }
}
