use std::fmt;

/// Syntactic shape of a use site.
///
/// Only the first three kinds are resolved through the tower; the others
/// belong to dedicated resolution paths and are rejected as a contract
/// violation if they reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// A name read: `x`, `a.x`.
    VariableAccess,
    /// A call: `f()`, `a.f()`.
    Function,
    /// A callable reference: `::f`, `A::f`.
    CallableReference,
    /// `this(...)` / `super(...)` delegation.
    DelegatingConstructorCall,
    /// Synthetic call produced for `when`/`if` type unification.
    SyntheticSelect,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallKind::VariableAccess => "variable access",
            CallKind::Function => "function call",
            CallKind::CallableReference => "callable reference",
            CallKind::DelegatingConstructorCall => "delegating constructor call",
            CallKind::SyntheticSelect => "synthetic select",
        };
        f.write_str(s)
    }
}
