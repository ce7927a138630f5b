//! Deterministic hash-based symbol identity.
//!
//! This module provides [`SymbolId`], a 64-bit hash that uniquely identifies a
//! declaration visible to the tower resolver. Ids are computed from the
//! declaration's container, name and signature, so:
//!
//! - The same declaration always gets the same id across runs
//! - Ids can be computed before the declaration is registered
//! - Overloads that differ only in parameter types get different ids
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that a member named
//! `x`, a top-level function named `x` and a local variable named `x` never
//! share an id.
//!
//! # Examples
//!
//! ```
//! use calltower_core::{FqName, SymbolId};
//!
//! let a = SymbolId::from_class(&FqName::from_dotted("app.A"));
//! let b = SymbolId::from_class(&FqName::from_dotted("app.A"));
//! assert_eq!(a, b);
//!
//! let f1 = SymbolId::from_member(a, "f", &[]);
//! let f2 = SymbolId::from_member(a, "f", &[a]);
//! assert_ne!(f1, f2);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

use crate::FqName;

/// Domain-specific mixing constants for id computation.
pub mod hash_constants {
    /// Separator constant for chaining components
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for classifier ids
    pub const CLASS: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for top-level callables
    pub const TOP_LEVEL: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for member callables
    pub const MEMBER: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for constructors
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for local declarations
    pub const LOCAL: u64 = 0x1a095090689d4647;

    /// Domain marker for synthesized declarations (function types, `invoke`)
    pub const SYNTHETIC: u64 = 0x3e9f5d2a8c7b1403;

    /// Parameter position mixing constants.
    /// Each position gets its own constant so parameter order matters.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit id for a declaration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolId(pub u64);

impl SymbolId {
    /// Empty/invalid id.
    pub const EMPTY: SymbolId = SymbolId(0);

    /// Id of a classifier (class, interface, object, companion).
    #[inline]
    pub fn from_class(fq_name: &FqName) -> Self {
        SymbolId(hash_constants::CLASS ^ xxh64(fq_name.to_string().as_bytes(), 0))
    }

    /// Id of a top-level function or property in a package.
    #[inline]
    pub fn from_top_level(package: &FqName, name: &str, params: &[SymbolId]) -> Self {
        let seed = hash_constants::TOP_LEVEL
            ^ xxh64(package.to_string().as_bytes(), 0)
            ^ xxh64(name.as_bytes(), 1);
        SymbolId(mix_params(seed, params))
    }

    /// Id of a member function or property of `owner`.
    #[inline]
    pub fn from_member(owner: SymbolId, name: &str, params: &[SymbolId]) -> Self {
        let seed = hash_constants::MEMBER ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        SymbolId(mix_params(seed, params))
    }

    /// Id of a constructor of `owner`.
    #[inline]
    pub fn from_constructor(owner: SymbolId, params: &[SymbolId]) -> Self {
        SymbolId(mix_params(hash_constants::CONSTRUCTOR ^ owner.0, params))
    }

    /// Id of a declaration inside a local scope.
    #[inline]
    pub fn from_local(scope_index: u32, name: &str, params: &[SymbolId]) -> Self {
        let seed = hash_constants::LOCAL
            ^ (scope_index as u64).wrapping_mul(hash_constants::SEP)
            ^ xxh64(name.as_bytes(), 0);
        SymbolId(mix_params(seed, params))
    }

    /// Id of a synthesized declaration, keyed by a descriptive name and its components.
    #[inline]
    pub fn synthetic(name: &str, components: &[SymbolId]) -> Self {
        SymbolId(mix_params(
            hash_constants::SYNTHETIC ^ xxh64(name.as_bytes(), 0),
            components,
        ))
    }

    /// Check if this is the empty id.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_params(seed: u64, params: &[SymbolId]) -> u64 {
    let mut hash = seed;
    for (i, param) in params.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps parameter order significant
        hash = hash.wrapping_mul(hash_constants::SEP).wrapping_add(marker ^ param.0);
    }
    hash
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({:#018x})", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ids_are_deterministic() {
        let name = FqName::from_dotted("app.model.User");
        assert_eq!(SymbolId::from_class(&name), SymbolId::from_class(&name));
        assert_ne!(
            SymbolId::from_class(&name),
            SymbolId::from_class(&FqName::from_dotted("app.model.Group"))
        );
    }

    #[test]
    fn domains_do_not_collide() {
        let pkg = FqName::from_dotted("app");
        let owner = SymbolId::from_class(&FqName::from_dotted("app.A"));
        let top = SymbolId::from_top_level(&pkg, "x", &[]);
        let member = SymbolId::from_member(owner, "x", &[]);
        let local = SymbolId::from_local(0, "x", &[]);
        assert_ne!(top, member);
        assert_ne!(top, local);
        assert_ne!(member, local);
    }

    #[test]
    fn parameter_order_matters() {
        let owner = SymbolId::from_class(&FqName::from_dotted("A"));
        let int = SymbolId::from_class(&FqName::from_dotted("Int"));
        let string = SymbolId::from_class(&FqName::from_dotted("String"));
        assert_ne!(
            SymbolId::from_member(owner, "f", &[int, string]),
            SymbolId::from_member(owner, "f", &[string, int])
        );
    }

    #[test]
    fn local_scopes_are_distinguished() {
        assert_ne!(
            SymbolId::from_local(1, "x", &[]),
            SymbolId::from_local(2, "x", &[])
        );
    }

    #[test]
    fn empty_id() {
        assert!(SymbolId::EMPTY.is_empty());
        assert!(!SymbolId::from_class(&FqName::from_dotted("A")).is_empty());
    }
}
