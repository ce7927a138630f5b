use calltower_core::{CallKind, Name, TypeRef};

use crate::receiver::ExplicitReceiver;

/// A use site to resolve.
///
/// Treated as immutable: the `replace_*`/`with_*` methods return modified
/// copies, each describing a new call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallInfo {
    pub name: Name,
    pub call_kind: CallKind,
    pub explicit_receiver: Option<ExplicitReceiver>,
    /// Alternative receiver of a callable reference (`A::f` where `A` may
    /// denote either the type or its companion).
    pub stub_receiver: Option<ExplicitReceiver>,
    /// Argument types, in call order.
    pub arguments: Vec<TypeRef>,
}

impl CallInfo {
    pub fn new(name: impl Into<Name>, call_kind: CallKind) -> Self {
        Self {
            name: name.into(),
            call_kind,
            explicit_receiver: None,
            stub_receiver: None,
            arguments: Vec::new(),
        }
    }

    /// A variable read `name`.
    pub fn variable(name: impl Into<Name>) -> Self {
        Self::new(name, CallKind::VariableAccess)
    }

    /// A call `name(arguments)`.
    pub fn function(name: impl Into<Name>, arguments: Vec<TypeRef>) -> Self {
        Self {
            arguments,
            ..Self::new(name, CallKind::Function)
        }
    }

    /// A callable reference `::name`.
    pub fn callable_reference(name: impl Into<Name>) -> Self {
        Self::new(name, CallKind::CallableReference)
    }

    pub fn with_explicit_receiver(mut self, receiver: ExplicitReceiver) -> Self {
        self.explicit_receiver = Some(receiver);
        self
    }

    pub fn with_stub_receiver(mut self, receiver: ExplicitReceiver) -> Self {
        self.stub_receiver = Some(receiver);
        self
    }

    pub fn replace_explicit_receiver(&self, receiver: Option<ExplicitReceiver>) -> Self {
        Self {
            explicit_receiver: receiver,
            ..self.clone()
        }
    }

    /// The same name read as a variable, as used to look for invoke receivers.
    pub fn replace_with_variable_access(&self) -> Self {
        Self {
            call_kind: CallKind::VariableAccess,
            stub_receiver: None,
            arguments: Vec::new(),
            ..self.clone()
        }
    }

    pub fn with_name(&self, name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Prepend a receiver value to the arguments.
    pub fn with_receiver_as_argument(&self, receiver: TypeRef) -> Self {
        let mut arguments = Vec::with_capacity(self.arguments.len() + 1);
        arguments.push(receiver);
        arguments.extend_from_slice(&self.arguments);
        Self {
            arguments,
            ..self.clone()
        }
    }
}
