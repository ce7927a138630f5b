//! Error types.
//!
//! ```text
//! RegistrationError - declaration store rejected a declaration
//! ResolutionError   - internal contract violation during resolution (fatal)
//! ```
//!
//! "Nothing found" and "ambiguous" are not errors; they are reported through
//! the candidate collector.

use thiserror::Error;

use crate::{CallKind, ScopeId, SymbolId};

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating a declaration store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A declaration with the same id already exists.
    #[error("duplicate {kind} '{name}'")]
    DuplicateSymbol {
        /// The declared name.
        name: String,
        /// What was being declared.
        kind: String,
    },

    /// The owning classifier is not registered.
    #[error("unknown owner {owner} for '{name}'")]
    UnknownOwner {
        /// The declared name.
        name: String,
        /// The missing owner.
        owner: SymbolId,
    },

    /// A lexical scope index that was never created.
    #[error("unknown scope {0}")]
    UnknownScope(ScopeId),

    /// The declaration cannot live where it was placed.
    #[error("invalid declaration '{name}': {reason}")]
    InvalidDeclaration {
        /// The declared name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

// ============================================================================
// Resolution Errors
// ============================================================================

/// Fatal errors during tower resolution.
///
/// These signal an inconsistency upstream of the resolver and abort the
/// current resolution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    /// A call kind the tower does not handle reached it.
    #[error("unsupported call kind in tower resolver: {kind} (resolving '{name}')")]
    UnsupportedCallKind {
        /// The offending kind.
        kind: CallKind,
        /// The name being resolved.
        name: String,
    },

    /// An internal invariant was broken.
    #[error("internal resolver error: {message}")]
    Internal {
        /// Description of the broken invariant.
        message: String,
    },
}
