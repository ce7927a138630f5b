//! Applicability checks run on every consumed candidate.
//!
//! The resolver only needs a verdict per candidate; type inference and
//! overload ranking happen elsewhere. [`ApplicabilityStage`] is a shallow
//! reference stage:
//!
//! 1. Hidden declarations are rejected
//! 2. The extension receiver must be present exactly when declared, and be a
//!    subtype of the declared receiver type
//! 3. Calls must supply every parameter without a default, and no more than
//!    declared unless the last parameter is vararg
//! 4. Each argument must be a subtype of its parameter
//! 5. Synthetic declarations rank below written ones

use calltower_core::{CallKind, Symbol, SymbolKind, SymbolProvider, TypeRef};

use crate::candidate::{Candidate, CandidateApplicability};

/// Judges a candidate reached by the tower.
pub trait StageRunner {
    fn process_candidate(
        &self,
        provider: &dyn SymbolProvider,
        candidate: &Candidate,
    ) -> CandidateApplicability;
}

/// Receiver and argument-shape checks without inference.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApplicabilityStage;

impl StageRunner for ApplicabilityStage {
    fn process_candidate(
        &self,
        provider: &dyn SymbolProvider,
        candidate: &Candidate,
    ) -> CandidateApplicability {
        let Some(symbol) = provider.symbol(candidate.symbol) else {
            return CandidateApplicability::Inapplicable;
        };
        if symbol.is_hidden() {
            return CandidateApplicability::Hidden;
        }

        if let SymbolKind::Class(kind) = symbol.kind {
            // Classifiers are only reached as object values.
            return if kind.is_object() && candidate.call.call_kind == CallKind::VariableAccess {
                CandidateApplicability::Resolved
            } else {
                CandidateApplicability::Inapplicable
            };
        }

        if !receiver_matches(provider, symbol, candidate) {
            return CandidateApplicability::WrongReceiver;
        }

        let applies_arguments = candidate.call.call_kind == CallKind::Function
            && matches!(symbol.kind, SymbolKind::Function | SymbolKind::Constructor);
        if applies_arguments {
            let verdict = check_arguments(provider, symbol, &candidate.arguments());
            if verdict != CandidateApplicability::Resolved {
                return verdict;
            }
        }

        if symbol.is_synthetic() {
            CandidateApplicability::SyntheticResolved
        } else {
            CandidateApplicability::Resolved
        }
    }
}

fn receiver_matches(provider: &dyn SymbolProvider, symbol: &Symbol, candidate: &Candidate) -> bool {
    if candidate.extension_receiver_as_argument || candidate.builtin_extension_receiver {
        return candidate.extension_receiver.is_some();
    }
    match (&symbol.receiver_type, &candidate.extension_receiver) {
        (None, None) => true,
        (Some(expected), Some(receiver)) => receiver
            .ty()
            .is_some_and(|actual| provider.is_subtype(&actual, expected)),
        _ => false,
    }
}

fn check_arguments(
    provider: &dyn SymbolProvider,
    symbol: &Symbol,
    arguments: &[TypeRef],
) -> CandidateApplicability {
    let params = &symbol.params;
    let is_vararg = symbol.is_vararg();

    // Too few arguments
    if arguments.len() < symbol.required_params() {
        return CandidateApplicability::ParameterMappingError;
    }

    // Too many arguments (unless vararg)
    if !is_vararg && arguments.len() > params.len() {
        return CandidateApplicability::ParameterMappingError;
    }

    for (arg, param) in arguments.iter().zip(params.iter()) {
        if !provider.is_subtype(arg, &param.ty) {
            return CandidateApplicability::Inapplicable;
        }
    }

    // Extra arguments all go to the vararg parameter.
    if is_vararg && arguments.len() > params.len() {
        let Some(vararg) = params.last() else {
            return CandidateApplicability::ParameterMappingError;
        };
        if arguments[params.len()..]
            .iter()
            .any(|arg| !provider.is_subtype(arg, &vararg.ty))
        {
            return CandidateApplicability::Inapplicable;
        }
    }

    CandidateApplicability::Resolved
}
