//! Calltower Resolver
//!
//! Finds the declarations a name at a use site can refer to by walking a
//! tower of scope levels from most local to most global. Every level is
//! assigned a priority group; the candidate collector keeps the best
//! candidates of the smallest successful group.
//!
//! ## Architecture
//!
//! - **Walks**: one suspendable [`walk`] per call, plus one per discovered
//!   invoke receiver, interleaved by a [`GroupScheduler`]
//! - **Levels**: member, lexical and invoke-extension levels, queried through
//!   a [`SymbolProvider`](calltower_core::SymbolProvider)
//! - **Consumers**: per call kind, decide what each level is queried for
//! - **Collection**: [`CandidateCollector`] ranks candidates by
//!   [`CandidateApplicability`] and group
//!
//! ## Modules
//!
//! - [`call`]: use sites
//! - [`candidate`]: candidates, collector and outcomes
//! - [`config`]: resolver configuration
//! - [`level`]: tower levels
//! - [`receiver`]: explicit and implicit receivers
//! - [`scheduler`]: group-keyed task queue
//! - [`stage`]: applicability checks
//! - [`tower`]: the entry point
//! - [`walk`]: level planning, group numbering and the emission log

pub mod call;
pub mod candidate;
pub mod config;
mod consumer;
pub mod level;
pub mod receiver;
pub mod scheduler;
pub mod stage;
pub mod tower;
pub mod walk;

pub use call::CallInfo;
pub use candidate::{
    Candidate, CandidateApplicability, CandidateCollector, ConsumedCandidate, ExplicitReceiverKind,
    ResolutionOutcome,
};
pub use config::ResolverConfig;
pub use consumer::ConsumerAction;
pub use level::{MemberDispatch, TowerDataKind, TowerLevel};
pub use receiver::{
    ExplicitReceiver, ExpressionReceiver, ImplicitReceiver, ImplicitReceiverId,
    ImplicitReceiverKind, PropertyRead, QualifierReceiver, ReceiverOrigin, ReceiverValue,
};
pub use scheduler::{GroupScheduler, WaitOutcome};
pub use stage::{ApplicabilityStage, StageRunner};
pub use tower::{Resolution, TowerResolver};
pub use walk::{GroupNumbering, LogEntry, TowerLog};

// Re-export the error from core for convenience
pub use calltower_core::ResolutionError;
