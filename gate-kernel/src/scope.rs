//! Per-agent allow-lists derived from assignment rows.

use std::collections::HashSet;
use std::hash::Hash;

use gate_primitives::Assignment;

/// Which targets one dimension (skills or servers) may load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<T: Eq + Hash> {
    /// No assignment rows: everything approved is loaded.
    Unscoped,
    /// Only these targets; empty when every row is disabled.
    AllowList(HashSet<T>),
}

impl<T: Copy + Eq + Hash> Scope<T> {
    /// Builds the scope from every assignment row of one agent.
    #[must_use]
    pub fn from_assignments(rows: &[Assignment<T>]) -> Self {
        if rows.is_empty() {
            return Self::Unscoped;
        }
        Self::AllowList(
            rows.iter()
                .filter(|row| row.is_enabled())
                .map(Assignment::target)
                .collect(),
        )
    }

    /// Whether `target` may be loaded.
    #[must_use]
    pub fn permits(&self, target: &T) -> bool {
        match self {
            Self::Unscoped => true,
            Self::AllowList(allowed) => allowed.contains(target),
        }
    }
}
