//! Shared model for the calltower resolver.
//!
//! This crate holds everything the resolver and a declaration store must
//! agree on:
//!
//! - [`Name`], [`FqName`]: identifiers and dotted paths
//! - [`SymbolId`]: deterministic declaration identity
//! - [`Symbol`], [`SymbolKind`], [`ClassKind`], [`SymbolFlags`]: declarations
//! - [`TypeRef`]: the shallow type model
//! - [`ScopeRef`], [`Token`], [`SymbolProvider`]: the scope provider contract
//! - [`CallKind`]: use-site shapes
//! - [`RegistrationError`], [`ResolutionError`]: error types

mod call_kind;
pub mod error;
mod fq_name;
mod name;
mod scope;
mod symbol;
mod symbol_id;
mod types;

pub use call_kind::CallKind;
pub use error::{RegistrationError, ResolutionError};
pub use fq_name::FqName;
pub use name::{Name, names};
pub use scope::{ScopeId, ScopeRef, SymbolProvider, Token};
pub use symbol::{ClassKind, Param, Symbol, SymbolFlags, SymbolKind};
pub use symbol_id::{SymbolId, hash_constants};
pub use types::TypeRef;
