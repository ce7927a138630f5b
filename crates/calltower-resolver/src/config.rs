//! Resolver configuration.

use rustc_hash::FxHashSet;

use calltower_core::{Name, names};

/// Knobs of the tower walk.
///
/// ```
/// use calltower_resolver::ResolverConfig;
///
/// let config = ResolverConfig::default()
///     .with_hides_members(["forEach", "use"])
///     .with_max_invoke_depth(2);
/// assert!(config.hides_members(&"use".into()));
/// assert_eq!(config.max_invoke_depth, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Function names whose top-level extensions outrank members.
    pub hides_members: FxHashSet<Name>,
    /// Operator called when a value is used as a function.
    pub invoke_name: Name,
    /// Whether a call may resolve to `invoke` on a same-named property.
    pub invoke_enabled: bool,
    /// Maximum nesting of invoke resolutions (`f()()` style chains of
    /// properties returning callables).
    pub max_invoke_depth: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            hides_members: names::HIDES_MEMBERS.iter().map(|&n| Name::new(n)).collect(),
            invoke_name: Name::new(names::INVOKE),
            invoke_enabled: true,
            max_invoke_depth: 4,
        }
    }
}

impl ResolverConfig {
    /// Replace the hides-members name set.
    pub fn with_hides_members<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        self.hides_members = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_invoke_name(mut self, name: impl Into<Name>) -> Self {
        self.invoke_name = name.into();
        self
    }

    pub fn with_invoke_enabled(mut self, enabled: bool) -> Self {
        self.invoke_enabled = enabled;
        self
    }

    pub fn with_max_invoke_depth(mut self, depth: u32) -> Self {
        self.max_invoke_depth = depth;
        self
    }

    /// Whether extensions named `name` are resolved before members.
    pub fn hides_members(&self, name: &Name) -> bool {
        self.hides_members.contains(name)
    }

    /// Whether a walk at `depth` may start another invoke resolution.
    pub fn allows_invoke_at(&self, depth: u32) -> bool {
        self.invoke_enabled && depth < self.max_invoke_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResolverConfig::default();
        assert!(config.hides_members(&Name::new("forEach")));
        assert!(!config.hides_members(&Name::new("map")));
        assert_eq!(config.invoke_name, "invoke");
        assert!(config.allows_invoke_at(0));
        assert!(!config.allows_invoke_at(4));
    }

    #[test]
    fn disabled_invoke_never_allows() {
        let config = ResolverConfig::default().with_invoke_enabled(false);
        assert!(!config.allows_invoke_at(0));
    }
}
