//! Candidates and the collector that keeps the best of them.
//!
//! The collector ranks candidates by applicability first and priority group
//! second: a more applicable candidate always replaces the current best set,
//! an equally applicable one replaces it only when found in a smaller group,
//! and one found in the same group joins it.

use std::fmt;
use std::rc::Rc;

use calltower_core::{SymbolId, SymbolProvider, TypeRef};

use crate::call::CallInfo;
use crate::receiver::ReceiverValue;
use crate::stage::StageRunner;

/// How the explicit receiver of a call is used by a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplicitReceiverKind {
    NoExplicitReceiver,
    DispatchReceiver,
    ExtensionReceiver,
}

/// Verdict of the applicability stage, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CandidateApplicability {
    Hidden,
    WrongReceiver,
    ParameterMappingError,
    Inapplicable,
    SyntheticResolved,
    Resolved,
}

impl CandidateApplicability {
    pub fn is_success(self) -> bool {
        self >= CandidateApplicability::SyntheticResolved
    }
}

/// A declaration reached through the tower, with the receivers that made it
/// reachable.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub symbol: SymbolId,
    pub explicit_receiver_kind: ExplicitReceiverKind,
    pub dispatch_receiver: Option<ReceiverValue>,
    pub extension_receiver: Option<ReceiverValue>,
    /// The extension receiver is passed to `invoke` as its first argument.
    pub extension_receiver_as_argument: bool,
    /// The extension receiver belongs to the property's function type, not
    /// to the property.
    pub builtin_extension_receiver: bool,
    /// Priority group the candidate was found in. Never revised.
    pub group: u32,
    pub call: Rc<CallInfo>,
}

impl Candidate {
    /// Arguments the candidate is applied to, including a receiver passed as
    /// an argument.
    pub fn arguments(&self) -> Vec<TypeRef> {
        let receiver = self
            .extension_receiver
            .as_ref()
            .filter(|_| self.extension_receiver_as_argument)
            .map(|r| r.ty().unwrap_or(TypeRef::Unknown));
        receiver
            .into_iter()
            .chain(self.call.arguments.iter().copied())
            .collect()
    }
}

/// One entry of the collector's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumedCandidate {
    pub group: u32,
    pub symbol: SymbolId,
    pub applicability: CandidateApplicability,
}

/// Final classification of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Resolved(Candidate),
    Ambiguous(Vec<Candidate>),
    /// Candidates were found but none is applicable.
    Inapplicable(Vec<Candidate>),
    NotFound,
}

/// Accumulates candidates and keeps the best ones.
pub struct CandidateCollector<'a> {
    provider: &'a dyn SymbolProvider,
    runner: &'a dyn StageRunner,
    candidates: Vec<Candidate>,
    current_applicability: CandidateApplicability,
    current_group: u32,
    history: Vec<ConsumedCandidate>,
}

impl<'a> CandidateCollector<'a> {
    pub fn new(provider: &'a dyn SymbolProvider, runner: &'a dyn StageRunner) -> Self {
        Self {
            provider,
            runner,
            candidates: Vec::new(),
            current_applicability: CandidateApplicability::Hidden,
            current_group: u32::MAX,
            history: Vec::new(),
        }
    }

    /// Forget everything collected so far.
    pub fn new_data_set(&mut self) {
        self.candidates.clear();
        self.history.clear();
        self.current_applicability = CandidateApplicability::Hidden;
        self.current_group = u32::MAX;
    }

    /// Run the stage on `candidate` and keep it if it is among the best.
    pub fn consume_candidate(
        &mut self,
        group: u32,
        candidate: Candidate,
    ) -> CandidateApplicability {
        let applicability = self.runner.process_candidate(self.provider, &candidate);
        tracing::trace!(
            group,
            symbol = %candidate.symbol,
            ?applicability,
            "consumed candidate"
        );
        self.history.push(ConsumedCandidate {
            group,
            symbol: candidate.symbol,
            applicability,
        });

        if applicability > self.current_applicability
            || (applicability == self.current_applicability && group < self.current_group)
        {
            self.candidates.clear();
            self.current_applicability = applicability;
            self.current_group = group;
        }
        if applicability == self.current_applicability && group == self.current_group {
            self.candidates.push(candidate);
        }
        applicability
    }

    pub fn is_success(&self) -> bool {
        self.current_applicability.is_success()
    }

    /// Smallest group among the current best candidates, `u32::MAX` when
    /// nothing was consumed.
    pub fn current_group(&self) -> u32 {
        self.current_group
    }

    /// The group of the best candidates once resolution has succeeded.
    pub fn success_group(&self) -> Option<u32> {
        self.is_success().then_some(self.current_group)
    }

    pub fn current_applicability(&self) -> CandidateApplicability {
        self.current_applicability
    }

    pub fn best_candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Every consumed candidate, in consumption order.
    pub fn history(&self) -> &[ConsumedCandidate] {
        &self.history
    }

    /// Smallest group any candidate for `symbol` was consumed in.
    pub fn group_of(&self, symbol: SymbolId) -> Option<u32> {
        self.history
            .iter()
            .filter(|c| c.symbol == symbol)
            .map(|c| c.group)
            .min()
    }

    pub fn outcome(&self) -> ResolutionOutcome {
        match self.candidates.as_slice() {
            [] => ResolutionOutcome::NotFound,
            candidates if !self.is_success() => {
                ResolutionOutcome::Inapplicable(candidates.to_vec())
            }
            [single] => ResolutionOutcome::Resolved(single.clone()),
            candidates => ResolutionOutcome::Ambiguous(candidates.to_vec()),
        }
    }
}

impl fmt::Debug for CandidateCollector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateCollector")
            .field("candidates", &self.candidates)
            .field("current_applicability", &self.current_applicability)
            .field("current_group", &self.current_group)
            .finish_non_exhaustive()
    }
}
