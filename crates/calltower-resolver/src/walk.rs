//! Tower walks: the suspendable traversal of levels for one call.
//!
//! A walk emits levels from most local to most global. Each emitted level
//! takes the next group key of the walk's numbering; between two levels the
//! walk polls the scheduler and may suspend (queued at its next key) or be
//! abandoned once a better group has already succeeded.
//!
//! Levels are planned in two phases. The prelude (hides-members extensions,
//! explicit receiver members, local scopes) is known up front. The rest
//! depends on which local scopes turned out non-empty and is planned once
//! the prelude is drained.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use calltower_core::{CallKind, ResolutionError, ScopeRef, SymbolProvider};

use crate::call::CallInfo;
use crate::candidate::CandidateCollector;
use crate::config::ResolverConfig;
use crate::consumer::{ConsumeEnv, ConsumerAction, LevelSource, TowerDataConsumer};
use crate::level::{MemberDispatch, TowerDataKind, TowerLevel};
use crate::receiver::{ImplicitReceiver, ImplicitReceiverId};
use crate::scheduler::{GroupScheduler, WaitOutcome};
use crate::stage::StageRunner;

// ============================================================================
// Group Numbering
// ============================================================================

/// Maps a walk's group counter to global group keys.
///
/// The root walk uses keys `0, 4, 8, ...`; consumers may also use `key + 1`.
/// An invoke walk started at parent key `k` uses `k + 2, k + 6, ...` so its
/// levels sit between the parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupNumbering {
    pub base: u32,
    pub stride: u32,
}

impl GroupNumbering {
    pub const STRIDE: u32 = 4;

    pub fn root() -> Self {
        Self {
            base: 0,
            stride: Self::STRIDE,
        }
    }

    pub fn key(&self, group: u32) -> u32 {
        self.base.saturating_add(group.saturating_mul(self.stride))
    }

    /// Numbering of an invoke walk discovered at `parent_key`.
    pub fn invoke_child(&self, parent_key: u32) -> Self {
        Self {
            base: parent_key.saturating_add(self.stride / 2),
            stride: self.stride,
        }
    }
}

// ============================================================================
// Emission Log
// ============================================================================

/// One emitted level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub walk: usize,
    pub key: u32,
    pub kind: TowerDataKind,
    pub level: TowerLevel,
    pub action: ConsumerAction,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "walk {} @{}: {} ({:?})", self.walk, self.key, self.level, self.action)
    }
}

/// Levels emitted during a resolution, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TowerLog {
    entries: Vec<LogEntry>,
}

impl TowerLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Keys emitted by one walk, in emission order.
    pub fn keys_of(&self, walk: usize) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|e| e.walk == walk)
            .map(|e| e.key)
            .collect()
    }

    /// Ids of every walk that emitted a level, in order of first emission.
    pub fn walks(&self) -> Vec<usize> {
        let mut walks = Vec::new();
        for entry in &self.entries {
            if !walks.contains(&entry.walk) {
                walks.push(entry.walk);
            }
        }
        walks
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }
}

impl fmt::Display for TowerLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Resolution State
// ============================================================================

/// Inputs fixed for a whole resolution.
#[derive(Clone, Copy)]
pub(crate) struct WalkInputs<'e, 'a> {
    pub provider: &'a dyn SymbolProvider,
    pub runner: &'a dyn StageRunner,
    pub implicit: &'e [ImplicitReceiver],
    pub config: &'e ResolverConfig,
    pub top_level: &'e [ScopeRef],
    pub local: &'e [ScopeRef],
}

impl WalkInputs<'_, '_> {
    fn source(&self) -> LevelSource<'_> {
        LevelSource {
            provider: self.provider,
            implicit: self.implicit,
            config: self.config,
        }
    }
}

/// Mutable state shared by every walk of one resolution.
pub(crate) struct ResolutionContext<'c, 'a> {
    pub collector: &'c mut CandidateCollector<'a>,
    pub scheduler: GroupScheduler<TowerWalk<'a>>,
    pub log: &'c mut TowerLog,
    next_walk_id: usize,
}

impl<'c, 'a> ResolutionContext<'c, 'a> {
    pub fn new(collector: &'c mut CandidateCollector<'a>, log: &'c mut TowerLog) -> Self {
        Self {
            collector,
            scheduler: GroupScheduler::new(),
            log,
            next_walk_id: 0,
        }
    }

    pub fn next_walk_id(&mut self) -> usize {
        let id = self.next_walk_id;
        self.next_walk_id += 1;
        id
    }

    /// Resume queued walks until none is left.
    pub fn drain(&mut self, inputs: &WalkInputs<'_, 'a>) -> Result<(), ResolutionError> {
        while let Some((_, walk)) = self.scheduler.pop() {
            walk.resume(inputs, self)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tower Walk
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct PlannedLevel {
    kind: TowerDataKind,
    level: TowerLevel,
    /// Index of the local scope this level queries without receivers.
    local: Option<usize>,
}

impl PlannedLevel {
    fn level(level: TowerLevel) -> Self {
        Self {
            kind: TowerDataKind::TowerLevel,
            level,
            local: None,
        }
    }

    fn scope(scope: ScopeRef, implicit_extension: Option<ImplicitReceiverId>) -> Self {
        Self::level(TowerLevel::Scope {
            scope,
            implicit_extension,
            extensions_only: false,
        })
    }

    fn member(
        dispatch: ImplicitReceiverId,
        implicit_extension: Option<ImplicitReceiverId>,
    ) -> Self {
        Self::level(TowerLevel::Member {
            dispatch: MemberDispatch::Implicit(dispatch),
            implicit_extension,
        })
    }
}

/// Suspendable traversal of the tower for one call.
pub(crate) struct TowerWalk<'a> {
    id: usize,
    info: Rc<CallInfo>,
    consumer: TowerDataConsumer<'a>,
    numbering: GroupNumbering,
    group: u32,
    /// Number of enclosing invoke resolutions.
    depth: u32,
    pending: VecDeque<PlannedLevel>,
    expanded: bool,
    non_empty_locals: Vec<usize>,
}

impl<'a> TowerWalk<'a> {
    pub fn new(
        id: usize,
        info: CallInfo,
        numbering: GroupNumbering,
        depth: u32,
        inputs: &WalkInputs<'_, 'a>,
    ) -> Result<Self, ResolutionError> {
        let consumer = TowerDataConsumer::for_call(&info, inputs.provider, inputs.runner)?;
        let mut walk = Self {
            id,
            info: Rc::new(info),
            consumer,
            numbering,
            group: 0,
            depth,
            pending: VecDeque::new(),
            expanded: false,
            non_empty_locals: Vec::new(),
        };
        walk.plan_prelude(inputs);
        Ok(walk)
    }

    /// Key of the next level to emit.
    pub fn next_key(&self) -> u32 {
        self.numbering.key(self.group)
    }

    fn plan_prelude(&mut self, inputs: &WalkInputs<'_, '_>) {
        let is_function = self.info.call_kind == CallKind::Function;

        if is_function && inputs.config.hides_members(&self.info.name) {
            for &scope in inputs.top_level {
                self.pending.push_back(PlannedLevel::level(TowerLevel::Scope {
                    scope,
                    implicit_extension: None,
                    extensions_only: true,
                }));
            }
        }

        self.pending.push_back(PlannedLevel {
            kind: TowerDataKind::Empty,
            level: TowerLevel::Empty,
            local: None,
        });

        let literal_receiver = self
            .info
            .explicit_receiver
            .as_ref()
            .is_some_and(|r| r.is_integer_literal());
        if is_function && literal_receiver {
            // Only the literal's own members are considered.
            self.expanded = true;
            return;
        }

        for (index, &scope) in inputs.local.iter().enumerate() {
            self.pending.push_back(PlannedLevel {
                local: Some(index),
                ..PlannedLevel::scope(scope, None)
            });
        }
    }

    /// Plan every level after the local scopes.
    fn plan_receivers(&mut self, inputs: &WalkInputs<'_, '_>) {
        let implicit = inputs.implicit;
        let mut blocked = false;

        for (i, receiver) in implicit.iter().enumerate() {
            let id = ImplicitReceiverId(i);

            if !(blocked && receiver.is_dispatch()) {
                self.pending.push_back(PlannedLevel::member(id, None));
                self.pending.push_back(PlannedLevel {
                    kind: TowerDataKind::Empty,
                    level: TowerLevel::OnlyImplicitReceiver(id),
                    local: None,
                });
                self.pending.push_back(PlannedLevel::member(id, Some(id)));

                for &local in &self.non_empty_locals {
                    if let Some(&scope) = inputs.local.get(local) {
                        self.pending.push_back(PlannedLevel::scope(scope, Some(id)));
                    }
                }

                let mut blocked_inner = false;
                for (j, other) in implicit.iter().enumerate() {
                    if let Some(scope) = other.static_scope {
                        self.pending.push_back(PlannedLevel::scope(scope, Some(id)));
                    }
                    if other.is_dispatch() {
                        for &scope in &other.companion_scopes {
                            self.pending.push_back(PlannedLevel::scope(scope, Some(id)));
                        }
                        if blocked_inner {
                            continue;
                        }
                        if other.blocks_outer_dispatch() {
                            blocked_inner = true;
                        }
                    }
                    if j != i {
                        self.pending
                            .push_back(PlannedLevel::member(ImplicitReceiverId(j), Some(id)));
                    }
                }
            }

            // Statics and companions stay reachable past the boundary.
            if let Some(scope) = receiver.static_scope {
                self.pending.push_back(PlannedLevel::scope(scope, None));
            }
            if receiver.is_dispatch() {
                for &scope in &receiver.companion_scopes {
                    self.pending.push_back(PlannedLevel::scope(scope, None));
                }
                if receiver.blocks_outer_dispatch() {
                    blocked = true;
                }
            }
        }

        for &scope in inputs.top_level {
            for i in 0..implicit.len() {
                self.pending
                    .push_back(PlannedLevel::scope(scope, Some(ImplicitReceiverId(i))));
            }
            self.pending.push_back(PlannedLevel::scope(scope, None));
        }
    }

    fn next_level(&mut self, inputs: &WalkInputs<'_, '_>) -> Option<PlannedLevel> {
        if self.pending.is_empty() && !self.expanded {
            self.expanded = true;
            self.plan_receivers(inputs);
        }
        self.pending.pop_front()
    }

    /// Emit levels until the walk finishes, suspends or is abandoned.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resume(
        mut self,
        inputs: &WalkInputs<'_, 'a>,
        ctx: &mut ResolutionContext<'_, 'a>,
    ) -> Result<(), ResolutionError> {
        if ctx
            .collector
            .success_group()
            .is_some_and(|group| group <= self.next_key())
        {
            tracing::debug!(walk = self.id, key = self.next_key(), "walk abandoned on resume");
            return Ok(());
        }

        let spawn_invoke = inputs.config.allows_invoke_at(self.depth);
        loop {
            let Some(planned) = self.next_level(inputs) else {
                tracing::trace!(walk = self.id, "walk finished");
                return Ok(());
            };
            let key = self.next_key();

            let mut spawned = Vec::new();
            let action = {
                let mut env = ConsumeEnv {
                    source: inputs.source(),
                    collector: &mut *ctx.collector,
                    spawn_invoke,
                    spawned: &mut spawned,
                };
                self.consumer
                    .consume(planned.kind, &planned.level, key, &self.info, &mut env)?
            };
            tracing::trace!(walk = self.id, key, level = %planned.level, ?action, "emitted level");
            ctx.log.push(LogEntry {
                walk: self.id,
                key,
                kind: planned.kind,
                level: planned.level,
                action,
            });

            if let (Some(local), ConsumerAction::More) = (planned.local, action) {
                self.non_empty_locals.push(local);
            }

            for call in spawned {
                let id = ctx.next_walk_id();
                let numbering = self.numbering.invoke_child(key);
                tracing::debug!(
                    parent = self.id,
                    walk = id,
                    base = numbering.base,
                    "spawned invoke walk"
                );
                let child = TowerWalk::new(id, call, numbering, self.depth + 1, inputs)?;
                ctx.scheduler.push(0, child);
            }

            self.group += 1;
            let next = self.next_key();
            match ctx.scheduler.poll_wait(next, ctx.collector.success_group()) {
                WaitOutcome::Continue => {}
                WaitOutcome::Suspend => {
                    ctx.scheduler.push(next, self);
                    return Ok(());
                }
                WaitOutcome::Abandon => {
                    tracing::debug!(walk = self.id, key = next, "walk abandoned");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use calltower_core::{FqName, TypeRef};
    use calltower_registry::{ClassDecl, Container, SymbolRegistry};

    use crate::receiver::ExplicitReceiver;
    use crate::stage::ApplicabilityStage;

    fn planned(walk: &mut TowerWalk<'_>, inputs: &WalkInputs<'_, '_>) -> Vec<TowerLevel> {
        std::iter::from_fn(|| walk.next_level(inputs))
            .map(|p| p.level)
            .collect()
    }

    #[test]
    fn numbering_interleaves_invoke_walks() {
        let root = GroupNumbering::root();
        assert_eq!((root.key(0), root.key(1), root.key(2)), (0, 4, 8));
        let child = root.invoke_child(root.key(2));
        assert_eq!((child.key(0), child.key(1)), (10, 14));
        assert!(child.key(0) > root.key(2) && child.key(0) < root.key(3));
    }

    #[test]
    fn integer_literal_function_calls_only_see_members() {
        let registry = SymbolRegistry::new();
        let config = ResolverConfig::default();
        let local = [ScopeRef::Lexical(calltower_core::ScopeId(0))];
        let inputs = WalkInputs {
            provider: &registry,
            runner: &ApplicabilityStage,
            implicit: &[],
            config: &config,
            top_level: &[],
            local: &local,
        };
        let info = CallInfo::function("plus", vec![])
            .with_explicit_receiver(ExplicitReceiver::expression(TypeRef::IntegerLiteral(
                calltower_core::SymbolId(1),
            )));
        let mut walk = TowerWalk::new(0, info, GroupNumbering::root(), 0, &inputs).unwrap();
        assert_eq!(planned(&mut walk, &inputs), vec![TowerLevel::Empty]);
    }

    #[test]
    fn non_inner_class_blocks_outer_members() {
        let mut registry = SymbolRegistry::new();
        let app = FqName::from_dotted("app");
        let outer = registry
            .register_class(Container::Package(app.clone()), ClassDecl::class("Outer"))
            .unwrap();
        let nested = registry
            .register_class(Container::Class(outer), ClassDecl::class("Nested"))
            .unwrap();
        let implicit = vec![
            ImplicitReceiver::for_class(&registry, nested),
            ImplicitReceiver::for_class(&registry, outer),
        ];
        let config = ResolverConfig::default();
        let inputs = WalkInputs {
            provider: &registry,
            runner: &ApplicabilityStage,
            implicit: &implicit,
            config: &config,
            top_level: &[],
            local: &[],
        };
        let mut walk =
            TowerWalk::new(0, CallInfo::variable("x"), GroupNumbering::root(), 0, &inputs).unwrap();
        let levels = planned(&mut walk, &inputs);

        let outer_dispatch = levels.iter().any(|level| {
            matches!(
                level,
                TowerLevel::Member {
                    dispatch: MemberDispatch::Implicit(ImplicitReceiverId(1)),
                    ..
                }
            )
        });
        assert!(!outer_dispatch);
        assert!(levels.contains(&TowerLevel::Scope {
            scope: ScopeRef::Static(outer),
            implicit_extension: None,
            extensions_only: false,
        }));
    }

    #[test]
    fn hides_members_levels_come_first() {
        let mut registry = SymbolRegistry::new();
        let top = registry.package(&FqName::from_dotted("lib"));
        let config = ResolverConfig::default();
        let top_level = [top];
        let inputs = WalkInputs {
            provider: &registry,
            runner: &ApplicabilityStage,
            implicit: &[],
            config: &config,
            top_level: &top_level,
            local: &[],
        };
        let mut walk = TowerWalk::new(
            0,
            CallInfo::function("forEach", vec![]),
            GroupNumbering::root(),
            0,
            &inputs,
        )
        .unwrap();
        assert_eq!(
            planned(&mut walk, &inputs),
            vec![
                TowerLevel::Scope {
                    scope: top,
                    implicit_extension: None,
                    extensions_only: true,
                },
                TowerLevel::Empty,
                TowerLevel::Scope {
                    scope: top,
                    implicit_extension: None,
                    extensions_only: false,
                },
            ]
        );
    }

    #[test]
    fn log_queries() {
        let mut log = TowerLog::new();
        for (walk, key) in [(0, 0), (1, 2), (0, 4)] {
            log.push(LogEntry {
                walk,
                key,
                kind: TowerDataKind::TowerLevel,
                level: TowerLevel::Empty,
                action: ConsumerAction::Stop,
            });
        }
        assert_eq!(log.keys_of(0), vec![0, 4]);
        assert_eq!(log.walks(), vec![0, 1]);
        assert_eq!(log.len(), 3);
    }
}
