//! Calltower
//!
//! Scope-tower name resolution for calls and variable reads.
//!
//! - [`core`]: the shared symbol, type and scope model
//! - [`registry`]: an in-memory declaration store implementing the scope
//!   provider contract
//! - [`resolver`]: the tower walk, candidate collection and group scheduler
//!
//! ```
//! use calltower::prelude::*;
//!
//! let mut registry = SymbolRegistry::new();
//! let app = FqName::from_dotted("app");
//! let greet = registry
//!     .register_function(Container::Package(app.clone()), FunctionDecl::new("greet"))
//!     .unwrap();
//! let top_level = registry.package(&app);
//!
//! let stage = ApplicabilityStage;
//! let resolver = TowerResolver::new(&registry, &stage).with_top_level_scopes([top_level]);
//! let resolution = resolver.run_resolver(&[], CallInfo::function("greet", vec![])).unwrap();
//! assert!(matches!(resolution.outcome(), ResolutionOutcome::Resolved(c) if c.symbol == greet));
//! ```

pub use calltower_core as core;
pub use calltower_registry as registry;
pub use calltower_resolver as resolver;

// Re-export main types
pub mod prelude {
    pub use calltower_core::{
        CallKind, ClassKind, FqName, Name, Param, RegistrationError, ResolutionError, ScopeId,
        ScopeRef, Symbol, SymbolFlags, SymbolId, SymbolKind, SymbolProvider, Token, TypeRef,
    };
    pub use calltower_registry::{ClassDecl, Container, FunctionDecl, PropertyDecl, SymbolRegistry};
    pub use calltower_resolver::{
        ApplicabilityStage, CallInfo, Candidate, CandidateApplicability, CandidateCollector,
        ExplicitReceiver, ExplicitReceiverKind, ImplicitReceiver, ImplicitReceiverId,
        ReceiverValue, Resolution, ResolutionOutcome, ResolverConfig, StageRunner, TowerLevel,
        TowerLog, TowerResolver,
    };
}
