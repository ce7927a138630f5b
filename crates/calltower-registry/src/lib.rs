//! Calltower Registry crate.
//!
//! Reference declaration store for the tower resolver:
//!
//! - [`SymbolRegistry`]: packages, imports, local scopes and classifiers,
//!   implementing [`SymbolProvider`](calltower_core::SymbolProvider)
//! - [`ClassHierarchy`]: supertype graph used for inheritance and subtyping
//! - [`FunctionDecl`], [`PropertyDecl`], [`ClassDecl`], [`Container`]:
//!   declaration descriptions accepted by the registry

mod decl;
mod hierarchy;
mod registry;

pub use decl::{ClassDecl, Container, FunctionDecl, PropertyDecl};
pub use hierarchy::ClassHierarchy;
pub use registry::SymbolRegistry;
