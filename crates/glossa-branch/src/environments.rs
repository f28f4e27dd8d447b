//! The environment-reference check consulted before a branch is deleted.
//!
//! Environments (staging, production, ...) pin a branch for delivery. They are
//! managed outside Glossa; all the branch store needs to know is whether any
//! of them still points at a branch.

use std::collections::HashMap;
use std::sync::RwLock;

use glossa_types::BranchId;

/// Answers whether any environment references a branch.
pub trait EnvironmentRegistry: Send + Sync {
    fn has_environments(&self, branch: BranchId) -> bool;
}

/// A registry with no environments: every branch is unbound.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEnvironments;

impl EnvironmentRegistry for NoEnvironments {
    fn has_environments(&self, _branch: BranchId) -> bool {
        false
    }
}

/// An in-memory registry mapping environment names to branches.
#[derive(Debug, Default)]
pub struct InMemoryEnvironments {
    bindings: RwLock<HashMap<String, BranchId>>,
}

impl InMemoryEnvironments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `environment` at `branch`, replacing any previous binding.
    pub fn bind(&self, environment: impl Into<String>, branch: BranchId) {
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings.insert(environment.into(), branch);
    }

    /// Remove an environment. Returns the branch it pointed at.
    pub fn unbind(&self, environment: &str) -> Option<BranchId> {
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings.remove(environment)
    }
}

impl EnvironmentRegistry for InMemoryEnvironments {
    fn has_environments(&self, branch: BranchId) -> bool {
        let bindings = self.bindings.read().unwrap_or_else(|e| e.into_inner());
        bindings.values().any(|bound| *bound == branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_environments_never_binds() {
        assert!(!NoEnvironments.has_environments(BranchId::new()));
    }

    #[test]
    fn bind_and_unbind() {
        let registry = InMemoryEnvironments::new();
        let branch = BranchId::new();

        registry.bind("production", branch);
        assert!(registry.has_environments(branch));
        assert!(!registry.has_environments(BranchId::new()));

        assert_eq!(registry.unbind("production"), Some(branch));
        assert!(!registry.has_environments(branch));
    }

    #[test]
    fn rebinding_moves_environment() {
        let registry = InMemoryEnvironments::new();
        let (a, b) = (BranchId::new(), BranchId::new());

        registry.bind("staging", a);
        registry.bind("staging", b);
        assert!(!registry.has_environments(a));
        assert!(registry.has_environments(b));
    }
}
