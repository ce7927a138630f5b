//! Resolver entry point.

use std::rc::Rc;

use calltower_core::{CallKind, FqName, ResolutionError, ScopeRef, SymbolProvider, Token};

use crate::call::CallInfo;
use crate::candidate::{Candidate, CandidateCollector, ResolutionOutcome};
use crate::config::ResolverConfig;
use crate::consumer::{LevelSource, collect, invoke_call};
use crate::level::TowerLevel;
use crate::receiver::ImplicitReceiver;
use crate::stage::StageRunner;
use crate::walk::{GroupNumbering, ResolutionContext, TowerLog, TowerWalk, WalkInputs};

/// Result of one top-level resolution.
#[derive(Debug)]
pub struct Resolution<'a> {
    pub collector: CandidateCollector<'a>,
    pub log: TowerLog,
}

impl Resolution<'_> {
    pub fn outcome(&self) -> ResolutionOutcome {
        self.collector.outcome()
    }

    pub fn best_candidates(&self) -> &[Candidate] {
        self.collector.best_candidates()
    }
}

/// Resolves calls against a fixed set of lexical scopes.
///
/// `local_scopes` are innermost first; `top_level_scopes` are ordered from
/// explicit imports to default imports.
pub struct TowerResolver<'a> {
    provider: &'a dyn SymbolProvider,
    runner: &'a dyn StageRunner,
    config: ResolverConfig,
    top_level_scopes: Vec<ScopeRef>,
    local_scopes: Vec<ScopeRef>,
}

impl<'a> TowerResolver<'a> {
    pub fn new(provider: &'a dyn SymbolProvider, runner: &'a dyn StageRunner) -> Self {
        Self {
            provider,
            runner,
            config: ResolverConfig::default(),
            top_level_scopes: Vec::new(),
            local_scopes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_top_level_scopes(mut self, scopes: impl IntoIterator<Item = ScopeRef>) -> Self {
        self.top_level_scopes = scopes.into_iter().collect();
        self
    }

    pub fn with_local_scopes(mut self, scopes: impl IntoIterator<Item = ScopeRef>) -> Self {
        self.local_scopes = scopes.into_iter().collect();
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `info` with a fresh collector.
    ///
    /// `implicit` lists the enclosing receivers, innermost first.
    #[tracing::instrument(
        skip(self, implicit, info),
        fields(name = %info.name, kind = %info.call_kind)
    )]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run_resolver(
        &self,
        implicit: &[ImplicitReceiver],
        info: CallInfo,
    ) -> Result<Resolution<'a>, ResolutionError> {
        let mut collector = CandidateCollector::new(self.provider, self.runner);
        let mut log = TowerLog::new();
        self.run_resolver_into(implicit, info, &mut collector, &mut log)?;
        Ok(Resolution { collector, log })
    }

    /// Resolve `info` into an existing collector.
    pub fn run_resolver_into(
        &self,
        implicit: &[ImplicitReceiver],
        info: CallInfo,
        collector: &mut CandidateCollector<'a>,
        log: &mut TowerLog,
    ) -> Result<(), ResolutionError> {
        if let Some(package) = info.explicit_receiver.as_ref().and_then(|r| r.package_only()) {
            return self.resolve_in_package(implicit, &info, package, collector, log);
        }

        let inputs = WalkInputs {
            provider: self.provider,
            runner: self.runner,
            implicit,
            config: &self.config,
            top_level: &self.top_level_scopes,
            local: &self.local_scopes,
        };
        let mut ctx = ResolutionContext::new(collector, log);
        let id = ctx.next_walk_id();
        let walk = TowerWalk::new(id, info, GroupNumbering::root(), 0, &inputs)?;
        ctx.scheduler.push(0, walk);
        ctx.drain(&inputs)
    }

    /// `pkg.name`: only the package's own declarations, all at group 0.
    fn resolve_in_package(
        &self,
        implicit: &[ImplicitReceiver],
        info: &CallInfo,
        package: &FqName,
        collector: &mut CandidateCollector<'a>,
        log: &mut TowerLog,
    ) -> Result<(), ResolutionError> {
        let Some(scope) = self.provider.package_scope(package) else {
            tracing::debug!(%package, "unknown package qualifier");
            return Ok(());
        };
        tracing::debug!(%package, "resolving in package");

        let source = LevelSource {
            provider: self.provider,
            implicit,
            config: &self.config,
        };
        let level = TowerLevel::Scope {
            scope,
            implicit_extension: None,
            extensions_only: false,
        };
        let bare = Rc::new(info.replace_explicit_receiver(None));

        match info.call_kind {
            CallKind::VariableAccess => {
                collect(source, collector, &level, 0, &bare, Token::Properties, false);
                collect(source, collector, &level, 0, &bare, Token::Objects, false);
            }
            CallKind::Function => {
                collect(source, collector, &level, 0, &bare, Token::Functions, false);
                if collector.is_success() || !self.config.allows_invoke_at(0) {
                    return Ok(());
                }

                let mut invoke_receivers = CandidateCollector::new(self.provider, self.runner);
                let receiver_info = Rc::new(bare.replace_with_variable_access());
                collect(
                    source,
                    &mut invoke_receivers,
                    &level,
                    0,
                    &receiver_info,
                    Token::Properties,
                    false,
                );
                if !invoke_receivers.is_success() {
                    return Ok(());
                }
                for receiver in invoke_receivers.best_candidates() {
                    let call = invoke_call(self.provider, &self.config, info, receiver)?;
                    self.run_resolver_into(implicit, call, collector, log)?;
                }
            }
            CallKind::CallableReference => {}
            kind => {
                return Err(ResolutionError::UnsupportedCallKind {
                    kind,
                    name: info.name.to_string(),
                });
            }
        }
        Ok(())
    }
}
