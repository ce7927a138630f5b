//! Scope levels: one queryable source of declarations in the tower.
//!
//! A level pairs a scope with the receivers candidates found in it are
//! reached through. Querying a level is read-only.

use std::fmt;

use calltower_core::{Name, ScopeRef, Symbol, SymbolId, SymbolProvider, Token};

use crate::receiver::{ExplicitReceiver, ImplicitReceiver, ImplicitReceiverId, ReceiverValue};

/// Whether a level is queried as is or stands in for a receiver-specific level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TowerDataKind {
    /// Stub replaced by a level built from the explicit receiver.
    Empty,
    TowerLevel,
}

/// Dispatch receiver of a member level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberDispatch {
    Explicit,
    Implicit(ImplicitReceiverId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TowerLevel {
    /// Members of the explicit receiver; nothing without one.
    Empty,
    /// `invoke` of an explicit receiver of extension function type, with the
    /// implicit receiver passed as its first argument.
    OnlyImplicitReceiver(ImplicitReceiverId),
    /// Members of a receiver's type.
    Member {
        dispatch: MemberDispatch,
        implicit_extension: Option<ImplicitReceiverId>,
    },
    /// Declarations of a package, import, local, static or companion scope.
    Scope {
        scope: ScopeRef,
        implicit_extension: Option<ImplicitReceiverId>,
        extensions_only: bool,
    },
}

impl TowerLevel {
    /// Member levels, including stubs replaced by members of the explicit
    /// receiver.
    pub fn is_member(&self) -> bool {
        !matches!(self, TowerLevel::Scope { .. })
    }

    pub fn has_explicit_dispatch(&self) -> bool {
        matches!(
            self,
            TowerLevel::Empty
                | TowerLevel::OnlyImplicitReceiver(_)
                | TowerLevel::Member {
                    dispatch: MemberDispatch::Explicit,
                    ..
                }
        )
    }
}

impl fmt::Display for TowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TowerLevel::Empty => f.write_str("explicit receiver members"),
            TowerLevel::OnlyImplicitReceiver(id) => write!(f, "invoke extension with {id}"),
            TowerLevel::Member {
                dispatch,
                implicit_extension,
            } => {
                match dispatch {
                    MemberDispatch::Explicit => f.write_str("members of explicit receiver")?,
                    MemberDispatch::Implicit(id) => write!(f, "members of {id}")?,
                }
                if let Some(ext) = implicit_extension {
                    write!(f, " with extension {ext}")?;
                }
                Ok(())
            }
            TowerLevel::Scope {
                scope,
                implicit_extension,
                extensions_only,
            } => {
                write!(f, "scope {scope}")?;
                if let Some(ext) = implicit_extension {
                    write!(f, " with extension {ext}")?;
                }
                if *extensions_only {
                    f.write_str(" (extensions only)")?;
                }
                Ok(())
            }
        }
    }
}

/// A declaration produced by a level.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LevelHit {
    pub symbol: SymbolId,
    pub dispatch: Option<ReceiverValue>,
    pub extension: Option<ReceiverValue>,
    pub extension_as_argument: bool,
    pub builtin_extension: bool,
}

impl LevelHit {
    fn classifier(symbol: SymbolId) -> Self {
        Self {
            symbol,
            dispatch: None,
            extension: None,
            extension_as_argument: false,
            builtin_extension: false,
        }
    }
}

/// Everything a level needs to answer a query for one call.
pub(crate) struct LevelQuery<'q> {
    pub provider: &'q dyn SymbolProvider,
    pub implicit: &'q [ImplicitReceiver],
    pub explicit: Option<&'q ExplicitReceiver>,
    pub name: &'q Name,
    pub invoke_name: &'q Name,
    /// Accept non-extension properties of extension function type when an
    /// extension receiver is present; they are invoked with it.
    pub allow_builtin_extension: bool,
}

impl LevelQuery<'_> {
    /// Feed every declaration `level` yields for `token` to `sink`.
    /// Returns the number of declarations found under the name, including
    /// those rejected for their receivers.
    pub fn process(
        &self,
        level: &TowerLevel,
        token: Token,
        sink: &mut dyn FnMut(LevelHit),
    ) -> usize {
        match *level {
            TowerLevel::Empty => match self.explicit {
                Some(_) => self.process_member(MemberDispatch::Explicit, None, token, sink),
                None => 0,
            },
            TowerLevel::OnlyImplicitReceiver(id) => self.process_invoke_extension(id, token, sink),
            TowerLevel::Member {
                dispatch,
                implicit_extension,
            } => self.process_member(dispatch, implicit_extension, token, sink),
            TowerLevel::Scope {
                scope,
                implicit_extension,
                extensions_only,
            } => self.process_scope(scope, implicit_extension, extensions_only, token, sink),
        }
    }

    fn process_member(
        &self,
        dispatch: MemberDispatch,
        implicit_extension: Option<ImplicitReceiverId>,
        token: Token,
        sink: &mut dyn FnMut(LevelHit),
    ) -> usize {
        let explicit_is_extension = dispatch != MemberDispatch::Explicit && self.explicit.is_some();
        if implicit_extension.is_some() && explicit_is_extension {
            return 0;
        }

        let (scope, dispatch_value) = match dispatch {
            MemberDispatch::Explicit => match self.explicit {
                Some(ExplicitReceiver::Qualifier(q)) => (q.class.map(ScopeRef::Qualifier), None),
                Some(receiver @ ExplicitReceiver::Expression(e)) => (
                    self.provider.type_scope(&e.ty),
                    Some(ReceiverValue::Explicit(receiver.clone())),
                ),
                None => return 0,
            },
            MemberDispatch::Implicit(id) => {
                let Some(value) = self.implicit_value(id) else {
                    return 0;
                };
                let scope = value.ty().and_then(|ty| self.provider.type_scope(&ty));
                (scope, Some(value))
            }
        };
        let Some(scope) = scope else {
            return 0;
        };

        let extension = match implicit_extension {
            Some(id) => match self.implicit_value(id) {
                Some(value) => Some(value),
                None => return 0,
            },
            None if explicit_is_extension => self.explicit.cloned().map(ReceiverValue::Explicit),
            None => None,
        };
        let qualifier = self.explicit.is_some_and(ExplicitReceiver::is_qualifier);
        let qualifier_dispatch = qualifier && dispatch == MemberDispatch::Explicit;

        let mut count = 0;
        self.provider
            .process_by_name(scope, self.name, token, &mut |id| {
                let Some(symbol) = self.provider.symbol(id) else {
                    return;
                };
                count += 1;
                if !symbol.is_callable() {
                    sink(LevelHit::classifier(id));
                    return;
                }
                // Statics are reached through the static scope, not instances.
                if !qualifier && symbol.is_static_like() {
                    return;
                }
                let shape = self.receiver_shape(symbol, extension.is_some(), token);
                let Some(builtin_extension) = shape else {
                    return;
                };
                let dispatch = if qualifier_dispatch {
                    self.object_owner(symbol)
                } else {
                    dispatch_value.clone()
                };
                sink(LevelHit {
                    symbol: id,
                    dispatch,
                    extension: extension.clone(),
                    extension_as_argument: false,
                    builtin_extension,
                });
            });
        count
    }

    fn process_invoke_extension(
        &self,
        id: ImplicitReceiverId,
        token: Token,
        sink: &mut dyn FnMut(LevelHit),
    ) -> usize {
        let Some(receiver @ ExplicitReceiver::Expression(e)) = self.explicit else {
            return 0;
        };
        if token != Token::Functions
            || self.name != self.invoke_name
            || !self.provider.is_extension_function_type(&e.ty)
        {
            return 0;
        }
        let (Some(scope), Some(extension)) =
            (self.provider.type_scope(&e.ty), self.implicit_value(id))
        else {
            return 0;
        };

        let mut count = 0;
        self.provider
            .process_by_name(scope, self.name, token, &mut |symbol_id| {
                let Some(symbol) = self.provider.symbol(symbol_id) else {
                    return;
                };
                count += 1;
                if !symbol.is_callable()
                    || symbol.has_extension_receiver()
                    || symbol.is_static_like()
                {
                    return;
                }
                sink(LevelHit {
                    symbol: symbol_id,
                    dispatch: Some(ReceiverValue::Explicit(receiver.clone())),
                    extension: Some(extension.clone()),
                    extension_as_argument: true,
                    builtin_extension: false,
                });
            });
        count
    }

    fn process_scope(
        &self,
        scope: ScopeRef,
        implicit_extension: Option<ImplicitReceiverId>,
        extensions_only: bool,
        token: Token,
        sink: &mut dyn FnMut(LevelHit),
    ) -> usize {
        if self.explicit.is_some() && implicit_extension.is_some() {
            return 0;
        }
        let extension = match (self.explicit, implicit_extension) {
            (Some(explicit), _) => Some(ReceiverValue::Explicit(explicit.clone())),
            (None, Some(id)) => match self.implicit_value(id) {
                Some(value) => Some(value),
                None => return 0,
            },
            (None, None) => None,
        };
        let scope_object = match scope {
            ScopeRef::Members(class) | ScopeRef::Qualifier(class) if self.is_object(class) => {
                Some(ReceiverValue::Object(class))
            }
            _ => None,
        };

        let mut count = 0;
        self.provider
            .process_by_name(scope, self.name, token, &mut |id| {
                let Some(symbol) = self.provider.symbol(id) else {
                    return;
                };
                count += 1;
                if !symbol.is_callable() {
                    if !extensions_only {
                        sink(LevelHit::classifier(id));
                    }
                    return;
                }
                if extensions_only && !symbol.has_extension_receiver() {
                    return;
                }
                let shape = self.receiver_shape(symbol, extension.is_some(), token);
                let Some(builtin_extension) = shape else {
                    return;
                };
                let dispatch = if symbol.is_static_like() {
                    None
                } else {
                    scope_object.clone().or_else(|| self.object_owner(symbol))
                };
                sink(LevelHit {
                    symbol: id,
                    dispatch,
                    extension: extension.clone(),
                    extension_as_argument: false,
                    builtin_extension,
                });
            });
        count
    }

    /// `Some(builtin)` when receiver presence matches the declaration:
    /// extension declarations need an extension receiver and others must not
    /// get one, except properties of extension function type when allowed.
    fn receiver_shape(&self, symbol: &Symbol, has_extension: bool, token: Token) -> Option<bool> {
        if symbol.has_extension_receiver() == has_extension {
            return Some(false);
        }
        let builtin = has_extension
            && self.allow_builtin_extension
            && token == Token::Properties
            && symbol.is_property()
            && self.provider.is_extension_function_type(&symbol.return_type);
        builtin.then_some(true)
    }

    fn implicit_value(&self, id: ImplicitReceiverId) -> Option<ReceiverValue> {
        self.implicit
            .get(id.0)
            .map(|receiver| ReceiverValue::Implicit { id, ty: receiver.ty })
    }

    fn is_object(&self, class: SymbolId) -> bool {
        self.provider
            .symbol(class)
            .and_then(Symbol::class_kind)
            .is_some_and(|kind| kind.is_object())
    }

    /// Members of objects are dispatched on the object itself.
    fn object_owner(&self, symbol: &Symbol) -> Option<ReceiverValue> {
        symbol
            .owner
            .filter(|&owner| !symbol.is_static_like() && self.is_object(owner))
            .map(ReceiverValue::Object)
    }
}
