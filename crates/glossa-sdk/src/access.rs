//! Project-level authorization check.
//!
//! Role assignment lives outside Glossa. The SDK asks a [`ProjectAccess`]
//! implementation before every call and never caches the answer.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use glossa_types::{ProjectId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Translator,
    Manager,
    Owner,
}

impl Role {
    /// Any project role.
    pub const ANY: &'static [Role] = &[Role::Viewer, Role::Translator, Role::Manager, Role::Owner];
    /// Roles allowed to edit translations.
    pub const EDITORS: &'static [Role] = &[Role::Translator, Role::Manager, Role::Owner];
    /// Roles allowed to create, delete, merge and re-point branches.
    pub const MAINTAINERS: &'static [Role] = &[Role::Manager, Role::Owner];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Viewer => "viewer",
            Self::Translator => "translator",
            Self::Manager => "manager",
            Self::Owner => "owner",
        };
        f.write_str(name)
    }
}

/// The caller lacks every role the operation accepts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("user {user} lacks the required role in project {project}")]
pub struct AccessDenied {
    pub user: UserId,
    pub project: ProjectId,
}

pub trait ProjectAccess: Send + Sync {
    /// Succeed if `user` holds one of `roles` in `project`.
    fn verify_project_access(
        &self,
        user: &UserId,
        project: &ProjectId,
        roles: &[Role],
    ) -> Result<(), AccessDenied>;
}

/// Grants everything. For local tools and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl ProjectAccess for AllowAll {
    fn verify_project_access(
        &self,
        _user: &UserId,
        _project: &ProjectId,
        _roles: &[Role],
    ) -> Result<(), AccessDenied> {
        Ok(())
    }
}

/// An in-memory role table.
#[derive(Debug, Default)]
pub struct StaticAccessList {
    grants: RwLock<HashMap<(UserId, ProjectId), Role>>,
}

impl StaticAccessList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user: impl Into<UserId>, project: impl Into<ProjectId>, role: Role) {
        let mut grants = self.grants.write().unwrap_or_else(|e| e.into_inner());
        grants.insert((user.into(), project.into()), role);
    }

    pub fn revoke(&self, user: &UserId, project: &ProjectId) -> Option<Role> {
        let mut grants = self.grants.write().unwrap_or_else(|e| e.into_inner());
        grants.remove(&(user.clone(), project.clone()))
    }
}

impl ProjectAccess for StaticAccessList {
    fn verify_project_access(
        &self,
        user: &UserId,
        project: &ProjectId,
        roles: &[Role],
    ) -> Result<(), AccessDenied> {
        let grants = self.grants.read().unwrap_or_else(|e| e.into_inner());
        match grants.get(&(user.clone(), project.clone())) {
            Some(role) if roles.contains(role) => Ok(()),
            _ => Err(AccessDenied {
                user: user.clone(),
                project: project.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_grants() {
        let user = UserId::new("alice");
        let project = ProjectId::new("acme");
        assert!(AllowAll
            .verify_project_access(&user, &project, Role::MAINTAINERS)
            .is_ok());
    }

    #[test]
    fn static_list_checks_role_membership() {
        let access = StaticAccessList::new();
        let alice = UserId::new("alice");
        let acme = ProjectId::new("acme");
        access.grant("alice", "acme", Role::Translator);

        assert!(access.verify_project_access(&alice, &acme, Role::ANY).is_ok());
        assert!(access.verify_project_access(&alice, &acme, Role::EDITORS).is_ok());
        let denied = access
            .verify_project_access(&alice, &acme, Role::MAINTAINERS)
            .unwrap_err();
        assert_eq!(denied.project, acme);

        let other = ProjectId::new("globex");
        assert!(access.verify_project_access(&alice, &other, Role::ANY).is_err());

        assert_eq!(access.revoke(&alice, &acme), Some(Role::Translator));
        assert!(access.verify_project_access(&alice, &acme, Role::ANY).is_err());
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Manager.to_string(), "manager");
    }
}
