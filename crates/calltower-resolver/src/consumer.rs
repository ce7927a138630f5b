//! Per-call-kind strategies deciding what each level is queried for.

use std::rc::Rc;

use calltower_core::{CallKind, ResolutionError, SymbolProvider, Token, TypeRef};

use crate::call::CallInfo;
use crate::candidate::{Candidate, CandidateCollector, ExplicitReceiverKind};
use crate::config::ResolverConfig;
use crate::level::{LevelQuery, TowerDataKind, TowerLevel};
use crate::receiver::{
    ExplicitReceiver, ExpressionReceiver, ImplicitReceiver, PropertyRead, ReceiverOrigin,
};
use crate::stage::StageRunner;

/// Result of feeding one level to a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerAction {
    /// The level declares something under the name.
    More,
    /// The level declares nothing under the name.
    Stop,
}

impl ConsumerAction {
    fn from_count(count: usize) -> Self {
        if count > 0 {
            ConsumerAction::More
        } else {
            ConsumerAction::Stop
        }
    }
}

/// Read-only inputs shared by every level of one resolution.
#[derive(Clone, Copy)]
pub(crate) struct LevelSource<'e> {
    pub provider: &'e dyn SymbolProvider,
    pub implicit: &'e [ImplicitReceiver],
    pub config: &'e ResolverConfig,
}

/// Mutable state a consumer writes into.
pub(crate) struct ConsumeEnv<'e, 'a> {
    pub source: LevelSource<'e>,
    pub collector: &'e mut CandidateCollector<'a>,
    /// Whether successful invoke receivers may start invoke resolutions.
    pub spawn_invoke: bool,
    /// Invoke calls discovered while consuming.
    pub spawned: &'e mut Vec<CallInfo>,
}

pub(crate) enum TowerDataConsumer<'a> {
    VariableAndObject,
    Function {
        /// Properties the call could be invoking, collected separately so
        /// they never compete with functions.
        invoke_receivers: CandidateCollector<'a>,
        invoke_receiver_info: Rc<CallInfo>,
    },
    CallableReference,
    /// Callable reference with a stub receiver: the stub goes first.
    Prioritized { stub_info: Rc<CallInfo> },
}

impl<'a> TowerDataConsumer<'a> {
    pub fn for_call(
        info: &CallInfo,
        provider: &'a dyn SymbolProvider,
        runner: &'a dyn StageRunner,
    ) -> Result<Self, ResolutionError> {
        Ok(match info.call_kind {
            CallKind::VariableAccess => TowerDataConsumer::VariableAndObject,
            CallKind::Function => TowerDataConsumer::Function {
                invoke_receivers: CandidateCollector::new(provider, runner),
                invoke_receiver_info: Rc::new(info.replace_with_variable_access()),
            },
            CallKind::CallableReference => match &info.stub_receiver {
                Some(stub) => TowerDataConsumer::Prioritized {
                    stub_info: Rc::new(CallInfo {
                        stub_receiver: None,
                        ..info.replace_explicit_receiver(Some(stub.clone()))
                    }),
                },
                None => TowerDataConsumer::CallableReference,
            },
            kind => {
                return Err(ResolutionError::UnsupportedCallKind {
                    kind,
                    name: info.name.to_string(),
                });
            }
        })
    }

    /// Query `level` for the declarations this call kind needs, consuming
    /// them at `key` (properties and functions) or `key + 1` (objects and
    /// the fallback of a prioritized consumer).
    pub fn consume(
        &mut self,
        kind: TowerDataKind,
        level: &TowerLevel,
        key: u32,
        info: &Rc<CallInfo>,
        env: &mut ConsumeEnv<'_, 'a>,
    ) -> Result<ConsumerAction, ResolutionError> {
        if kind == TowerDataKind::Empty && info.explicit_receiver.is_none() {
            return Ok(ConsumerAction::Stop);
        }
        let source = env.source;
        let query = |collector: &mut CandidateCollector<'a>, key, info: &Rc<CallInfo>, token| {
            collect(source, collector, level, key, info, token, false)
        };

        let count = match self {
            TowerDataConsumer::VariableAndObject => {
                let mut count = query(env.collector, key, info, Token::Properties);
                if level.is_member() || info.explicit_receiver.is_none() {
                    count += query(env.collector, key + 1, info, Token::Objects);
                }
                count
            }
            TowerDataConsumer::Function {
                invoke_receivers,
                invoke_receiver_info,
            } => {
                let mut count = query(env.collector, key, info, Token::Functions);
                if env.collector.is_success()
                    || !env.spawn_invoke
                    || invoke_receivers.is_success()
                {
                    return Ok(ConsumerAction::from_count(count));
                }

                count += collect(
                    source,
                    invoke_receivers,
                    level,
                    key,
                    invoke_receiver_info,
                    Token::Properties,
                    true,
                );
                if invoke_receivers.is_success() {
                    for receiver in invoke_receivers.best_candidates() {
                        let call = invoke_call(source.provider, source.config, info, receiver)?;
                        env.spawned.push(call);
                    }
                }
                count
            }
            TowerDataConsumer::CallableReference => {
                query(env.collector, key, info, Token::Functions)
                    + query(env.collector, key, info, Token::Properties)
            }
            TowerDataConsumer::Prioritized { stub_info } => {
                let mut count = query(env.collector, key, stub_info, Token::Functions)
                    + query(env.collector, key, stub_info, Token::Properties);
                if !env.collector.is_success() {
                    count += query(env.collector, key + 1, info, Token::Functions)
                        + query(env.collector, key + 1, info, Token::Properties);
                }
                count
            }
        };
        Ok(ConsumerAction::from_count(count))
    }
}

impl ExplicitReceiverKind {
    /// How a level uses the explicit receiver of `info`.
    pub(crate) fn for_level(info: &CallInfo, level: &TowerLevel) -> Self {
        match &info.explicit_receiver {
            None => ExplicitReceiverKind::NoExplicitReceiver,
            Some(ExplicitReceiver::Qualifier(_)) if level.is_member() => {
                ExplicitReceiverKind::NoExplicitReceiver
            }
            Some(ExplicitReceiver::Qualifier(_)) => ExplicitReceiverKind::ExtensionReceiver,
            Some(ExplicitReceiver::Expression(_)) if level.has_explicit_dispatch() => {
                ExplicitReceiverKind::DispatchReceiver
            }
            Some(ExplicitReceiver::Expression(_)) => ExplicitReceiverKind::ExtensionReceiver,
        }
    }
}

/// Feed the declarations `level` yields for `token` to `collector` at `key`.
pub(crate) fn collect(
    source: LevelSource<'_>,
    collector: &mut CandidateCollector<'_>,
    level: &TowerLevel,
    key: u32,
    info: &Rc<CallInfo>,
    token: Token,
    allow_builtin_extension: bool,
) -> usize {
    let query = LevelQuery {
        provider: source.provider,
        implicit: source.implicit,
        explicit: info.explicit_receiver.as_ref(),
        name: &info.name,
        invoke_name: &source.config.invoke_name,
        allow_builtin_extension,
    };
    let explicit_receiver_kind = ExplicitReceiverKind::for_level(info, level);
    query.process(level, token, &mut |hit| {
        collector.consume_candidate(
            key,
            Candidate {
                symbol: hit.symbol,
                explicit_receiver_kind,
                dispatch_receiver: hit.dispatch,
                extension_receiver: hit.extension,
                extension_receiver_as_argument: hit.extension_as_argument,
                builtin_extension_receiver: hit.builtin_extension,
                group: key,
                call: Rc::clone(info),
            },
        );
    })
}

/// The call `receiver.invoke(arguments)` replacing `info` once `receiver`, a
/// property named like the call, was found.
///
/// A property of extension function type reached through an extension
/// receiver it does not declare takes that receiver as the first `invoke`
/// argument.
pub(crate) fn invoke_call(
    provider: &dyn SymbolProvider,
    config: &ResolverConfig,
    info: &CallInfo,
    receiver: &Candidate,
) -> Result<CallInfo, ResolutionError> {
    let property = provider
        .symbol(receiver.symbol)
        .ok_or_else(|| ResolutionError::Internal {
            message: format!("invoke receiver {} has no symbol", receiver.symbol),
        })?;
    let extension_as_argument = receiver.builtin_extension_receiver
        && property.receiver_type.is_none()
        && provider.is_extension_function_type(&property.return_type);

    let read = PropertyRead {
        property: property.id,
        dispatch_receiver: receiver.dispatch_receiver.clone(),
        extension_receiver: if extension_as_argument {
            None
        } else {
            receiver.extension_receiver.clone()
        },
    };
    let explicit = ExplicitReceiver::Expression(ExpressionReceiver {
        ty: property.return_type,
        origin: ReceiverOrigin::PropertyRead(Box::new(read)),
    });

    let call = info
        .replace_explicit_receiver(Some(explicit))
        .with_name(config.invoke_name.clone());
    if !extension_as_argument {
        return Ok(call);
    }
    let extension_type = receiver
        .extension_receiver
        .as_ref()
        .and_then(|r| r.ty())
        .unwrap_or(TypeRef::Unknown);
    Ok(call.with_receiver_as_argument(extension_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    use calltower_core::{FqName, Name, ScopeRef, SymbolId};
    use calltower_registry::{ClassDecl, Container, PropertyDecl, SymbolRegistry};

    use crate::level::MemberDispatch;
    use crate::receiver::{ImplicitReceiverId, ReceiverValue};
    use crate::stage::ApplicabilityStage;

    fn registry_with_class() -> (SymbolRegistry, SymbolId) {
        let mut registry = SymbolRegistry::new();
        let a = registry
            .register_class(Container::Package(FqName::from_dotted("app")), ClassDecl::class("A"))
            .unwrap();
        (registry, a)
    }

    #[test]
    fn unsupported_kinds_fail_fast() {
        let registry = SymbolRegistry::new();
        let info = CallInfo::new("this", CallKind::DelegatingConstructorCall);
        let err = TowerDataConsumer::for_call(&info, &registry, &ApplicabilityStage).err();
        assert!(matches!(
            err,
            Some(ResolutionError::UnsupportedCallKind {
                kind: CallKind::DelegatingConstructorCall,
                ..
            })
        ));
    }

    #[test]
    fn explicit_receiver_kind_per_level() {
        let (registry, a) = registry_with_class();
        let member = TowerLevel::Member {
            dispatch: MemberDispatch::Explicit,
            implicit_extension: None,
        };
        let implicit_member = TowerLevel::Member {
            dispatch: MemberDispatch::Implicit(ImplicitReceiverId(0)),
            implicit_extension: None,
        };
        let scope = TowerLevel::Scope {
            scope: ScopeRef::Static(a),
            implicit_extension: None,
            extensions_only: false,
        };

        let plain = CallInfo::variable("x");
        assert_eq!(
            ExplicitReceiverKind::for_level(&plain, &member),
            ExplicitReceiverKind::NoExplicitReceiver
        );

        let expr = plain.replace_explicit_receiver(Some(ExplicitReceiver::expression(TypeRef::Class(a))));
        assert_eq!(
            ExplicitReceiverKind::for_level(&expr, &member),
            ExplicitReceiverKind::DispatchReceiver
        );
        assert_eq!(
            ExplicitReceiverKind::for_level(&expr, &implicit_member),
            ExplicitReceiverKind::ExtensionReceiver
        );
        assert_eq!(
            ExplicitReceiverKind::for_level(&expr, &scope),
            ExplicitReceiverKind::ExtensionReceiver
        );

        let qualified = plain.replace_explicit_receiver(Some(ExplicitReceiver::class_qualifier(&registry, "app", a)));
        assert_eq!(
            ExplicitReceiverKind::for_level(&qualified, &TowerLevel::Empty),
            ExplicitReceiverKind::NoExplicitReceiver
        );
        assert_eq!(
            ExplicitReceiverKind::for_level(&qualified, &scope),
            ExplicitReceiverKind::ExtensionReceiver
        );
    }

    #[test]
    fn invoke_call_passes_builtin_receiver_as_argument() {
        let (mut registry, a) = registry_with_class();
        let block_type = registry.function_type(Some(TypeRef::Class(a)), &[], TypeRef::Unknown);
        let local = registry.local_scope();
        let block = registry
            .register_property(Container::Local(local), PropertyDecl::new("block", block_type))
            .unwrap();

        let info = CallInfo::function("block", vec![TypeRef::Unknown]);
        let extension = ReceiverValue::Implicit {
            id: ImplicitReceiverId(0),
            ty: TypeRef::Class(a),
        };
        let receiver = Candidate {
            symbol: block,
            explicit_receiver_kind: ExplicitReceiverKind::NoExplicitReceiver,
            dispatch_receiver: None,
            extension_receiver: Some(extension.clone()),
            extension_receiver_as_argument: false,
            builtin_extension_receiver: true,
            group: 8,
            call: Rc::new(info.replace_with_variable_access()),
        };
        let config = ResolverConfig::default();

        let call = invoke_call(&registry, &config, &info, &receiver).unwrap();
        assert_eq!(call.name, "invoke");
        assert_eq!(call.arguments, vec![TypeRef::Class(a), TypeRef::Unknown]);
        match &call.explicit_receiver {
            Some(ExplicitReceiver::Expression(e)) => {
                assert_eq!(e.ty, block_type);
                let ReceiverOrigin::PropertyRead(read) = &e.origin else {
                    panic!("expected a property read, got {:?}", e.origin);
                };
                assert_eq!(read.property, block);
                assert_eq!(read.extension_receiver, None);
            }
            other => panic!("expected an expression receiver, got {other:?}"),
        }

        let plain = Candidate {
            builtin_extension_receiver: false,
            ..receiver
        };
        let call = invoke_call(&registry, &config, &info, &plain).unwrap();
        assert_eq!(call.arguments, vec![TypeRef::Unknown]);
        let Some(ExplicitReceiver::Expression(e)) = &call.explicit_receiver else {
            panic!("expected an expression receiver");
        };
        let ReceiverOrigin::PropertyRead(read) = &e.origin else {
            panic!("expected a property read");
        };
        assert_eq!(read.extension_receiver, Some(extension));
    }

    #[test]
    fn function_consumer_spawns_invoke_once() {
        let (mut registry, a) = registry_with_class();
        let fn_type = registry.function_type(None, &[], TypeRef::Unknown);
        registry
            .register_property(Container::Class(a), PropertyDecl::new("f", fn_type))
            .unwrap();

        let implicit = vec![ImplicitReceiver::for_class(&registry, a)];
        let config = ResolverConfig::default();
        let stage = ApplicabilityStage;
        let info = Rc::new(CallInfo::function("f", vec![]));
        let mut consumer = TowerDataConsumer::for_call(&info, &registry, &stage).unwrap();
        let mut collector = CandidateCollector::new(&registry, &stage);
        let mut spawned = Vec::new();
        let level = TowerLevel::Member {
            dispatch: MemberDispatch::Implicit(ImplicitReceiverId(0)),
            implicit_extension: None,
        };

        for key in [4, 8] {
            let mut env = ConsumeEnv {
                source: LevelSource {
                    provider: &registry,
                    implicit: &implicit,
                    config: &config,
                },
                collector: &mut collector,
                spawn_invoke: true,
                spawned: &mut spawned,
            };
            consumer
                .consume(TowerDataKind::TowerLevel, &level, key, &info, &mut env)
                .unwrap();
        }

        assert!(!collector.is_success());
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].name, Name::new("invoke"));
        assert_eq!(spawned[0].explicit_receiver.as_ref().and_then(ExplicitReceiver::ty), Some(fn_type));
    }

    #[test]
    fn invoke_call_on_unknown_property_is_internal_error() {
        let registry = SymbolRegistry::new();
        let info = CallInfo::function("f", vec![]);
        let receiver = Candidate {
            symbol: SymbolId(404),
            explicit_receiver_kind: ExplicitReceiverKind::NoExplicitReceiver,
            dispatch_receiver: None,
            extension_receiver: None,
            extension_receiver_as_argument: false,
            builtin_extension_receiver: false,
            group: 0,
            call: Rc::new(info.replace_with_variable_access()),
        };
        let err = invoke_call(&registry, &ResolverConfig::default(), &info, &receiver);
        assert!(matches!(err, Err(ResolutionError::Internal { .. })));
    }

    #[test]
    fn empty_level_without_receiver_stops() {
        let registry = SymbolRegistry::new();
        let config = ResolverConfig::default();
        let stage = ApplicabilityStage;
        let info = Rc::new(CallInfo::variable("x"));
        let mut consumer = TowerDataConsumer::for_call(&info, &registry, &stage).unwrap();
        let mut collector = CandidateCollector::new(&registry, &stage);
        let mut spawned = Vec::new();
        let mut env = ConsumeEnv {
            source: LevelSource {
                provider: &registry,
                implicit: &[],
                config: &config,
            },
            collector: &mut collector,
            spawn_invoke: true,
            spawned: &mut spawned,
        };
        assert_eq!(
            consumer.consume(TowerDataKind::Empty, &TowerLevel::Empty, 0, &info, &mut env),
            Ok(ConsumerAction::Stop)
        );
    }
}
