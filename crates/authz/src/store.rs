//! Persistence collaborator: the interface the engine loads associations
//! through, plus an in-memory reference implementation.
//!
//! The engine never talks to a database directly. A host backs
//! [`AuthorizationStore`] with whatever storage it has; [`InMemoryStore`]
//! serves tests and single-process deployments.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use rolegate_core::{PermissionId, RoleId, SubjectId};

use crate::{Permission, PermissionRef, Role, RoleRef};

/// Storage interface for role/permission associations.
///
/// Load methods return entries in a stable order (insertion order for the
/// in-memory store). Slug lookups expect slugs already in normalized form;
/// the engine normalizes before resolving.
pub trait AuthorizationStore {
    /// Roles assigned to a subject.
    fn roles_for_subject(&self, subject: SubjectId) -> Vec<Role>;

    /// Permissions granted through any of the given roles, deduplicated by
    /// permission id.
    fn permissions_for_roles(&self, roles: &[RoleId]) -> Vec<Permission>;

    /// Ids of every role leveled strictly below `level`. Serves the
    /// hierarchical inheritance union in
    /// [`crate::AuthorizationEngine::role_permissions`].
    fn role_ids_below_level(&self, level: i32) -> Vec<RoleId>;

    /// Permissions attached to the subject directly, bypassing roles.
    fn direct_permissions_for_subject(&self, subject: SubjectId) -> Vec<Permission>;

    /// Associate a role with a subject. Idempotent: attaching an existing
    /// association leaves a single logical record.
    fn attach_role(&mut self, subject: SubjectId, role: RoleId);

    /// Remove a role association; `None` removes all of the subject's roles.
    fn detach_role(&mut self, subject: SubjectId, role: Option<RoleId>);

    /// Associate a permission directly with a subject. Idempotent.
    fn attach_permission(&mut self, subject: SubjectId, permission: PermissionId);

    /// Remove a direct permission association; `None` removes all.
    fn detach_permission(&mut self, subject: SubjectId, permission: Option<PermissionId>);

    /// Resolve a role reference. `None` when nothing matches.
    fn find_role(&self, role: &RoleRef) -> Option<Role>;

    /// Resolve a permission reference. `None` when nothing matches.
    fn find_permission(&self, permission: &PermissionRef) -> Option<Permission>;
}

/// One subject-side association record. `attached_at` mirrors the pivot
/// timestamps of relational backends.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Association<T> {
    target: T,
    attached_at: DateTime<Utc>,
}

/// In-memory [`AuthorizationStore`]: role/permission catalogs plus
/// subject associations, all in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    role_grants: HashMap<RoleId, Vec<PermissionId>>,
    subject_roles: HashMap<SubjectId, Vec<Association<RoleId>>>,
    subject_permissions: HashMap<SubjectId, Vec<Association<PermissionId>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role to the catalog, returning its id.
    pub fn add_role(&mut self, role: Role) -> RoleId {
        let id = role.id;
        self.roles.push(role);
        id
    }

    /// Add a permission to the catalog, returning its id.
    pub fn add_permission(&mut self, permission: Permission) -> PermissionId {
        let id = permission.id;
        self.permissions.push(permission);
        id
    }

    /// Grant a permission to a role.
    pub fn grant_to_role(&mut self, role: RoleId, permission: PermissionId) {
        let grants = self.role_grants.entry(role).or_default();
        if !grants.contains(&permission) {
            grants.push(permission);
        }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// When the subject's role association was created, if present.
    pub fn role_attached_at(&self, subject: SubjectId, role: RoleId) -> Option<DateTime<Utc>> {
        self.subject_roles
            .get(&subject)?
            .iter()
            .find(|a| a.target == role)
            .map(|a| a.attached_at)
    }

    fn role_by_id(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    fn permission_by_id(&self, id: PermissionId) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.id == id)
    }
}

impl AuthorizationStore for InMemoryStore {
    fn roles_for_subject(&self, subject: SubjectId) -> Vec<Role> {
        self.subject_roles
            .get(&subject)
            .map(|assocs| {
                assocs
                    .iter()
                    .filter_map(|a| self.role_by_id(a.target).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn permissions_for_roles(&self, roles: &[RoleId]) -> Vec<Permission> {
        let mut out: Vec<Permission> = Vec::new();
        for role in roles {
            let Some(grants) = self.role_grants.get(role) else {
                continue;
            };
            for grant in grants {
                if out.iter().any(|p| p.id == *grant) {
                    continue;
                }
                if let Some(permission) = self.permission_by_id(*grant) {
                    out.push(permission.clone());
                }
            }
        }
        out
    }

    fn role_ids_below_level(&self, level: i32) -> Vec<RoleId> {
        self.roles
            .iter()
            .filter(|r| r.level < level)
            .map(|r| r.id)
            .collect()
    }

    fn direct_permissions_for_subject(&self, subject: SubjectId) -> Vec<Permission> {
        self.subject_permissions
            .get(&subject)
            .map(|assocs| {
                assocs
                    .iter()
                    .filter_map(|a| self.permission_by_id(a.target).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attach_role(&mut self, subject: SubjectId, role: RoleId) {
        let assocs = self.subject_roles.entry(subject).or_default();
        if assocs.iter().any(|a| a.target == role) {
            return;
        }
        assocs.push(Association {
            target: role,
            attached_at: Utc::now(),
        });
    }

    fn detach_role(&mut self, subject: SubjectId, role: Option<RoleId>) {
        match role {
            Some(role) => {
                if let Some(assocs) = self.subject_roles.get_mut(&subject) {
                    assocs.retain(|a| a.target != role);
                }
            }
            None => {
                self.subject_roles.remove(&subject);
            }
        }
    }

    fn attach_permission(&mut self, subject: SubjectId, permission: PermissionId) {
        let assocs = self.subject_permissions.entry(subject).or_default();
        if assocs.iter().any(|a| a.target == permission) {
            return;
        }
        assocs.push(Association {
            target: permission,
            attached_at: Utc::now(),
        });
    }

    fn detach_permission(&mut self, subject: SubjectId, permission: Option<PermissionId>) {
        match permission {
            Some(permission) => {
                if let Some(assocs) = self.subject_permissions.get_mut(&subject) {
                    assocs.retain(|a| a.target != permission);
                }
            }
            None => {
                self.subject_permissions.remove(&subject);
            }
        }
    }

    fn find_role(&self, role: &RoleRef) -> Option<Role> {
        match role {
            RoleRef::Id(id) => self.role_by_id(*id).cloned(),
            RoleRef::Slug(slug) => self.roles.iter().find(|r| r.slug.as_str() == slug).cloned(),
        }
    }

    fn find_permission(&self, permission: &PermissionRef) -> Option<Permission> {
        match permission {
            PermissionRef::Id(id) => self.permission_by_id(*id).cloned(),
            PermissionRef::Slug(slug) => self
                .permissions
                .iter()
                .find(|p| p.slug.as_str() == slug)
                .cloned(),
        }
    }
}
