//! Per-subject memoization of resolved roles and permissions.
//!
//! The cache is process-local and request-scoped: no TTL, no cross-process
//! sharing. It exists purely to avoid redundant store loads while one
//! subject is being evaluated. Single-owner access per subject is assumed;
//! a multi-threaded host keeps one engine (and thus one cache) per in-flight
//! request or wraps it in external synchronization.

use std::collections::HashMap;

use rolegate_core::SubjectId;

use crate::{Permission, Role};

/// Cached state for one subject. Both sets start unresolved and are
/// populated on first read.
#[derive(Debug, Clone, Default)]
pub struct SubjectCache {
    pub roles: Option<Vec<Role>>,
    pub permissions: Option<Vec<Permission>>,
}

/// Keyed map of [`SubjectCache`] entries, owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationCache {
    entries: HashMap<SubjectId, SubjectCache>,
}

impl AuthorizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, subject: SubjectId) -> &mut SubjectCache {
        self.entries.entry(subject).or_default()
    }

    pub fn get(&self, subject: SubjectId) -> Option<&SubjectCache> {
        self.entries.get(&subject)
    }

    /// Drop the cached role set (and the permission set, which is derived
    /// from it) for one subject.
    pub fn invalidate_roles(&mut self, subject: SubjectId) {
        if let Some(entry) = self.entries.get_mut(&subject) {
            entry.roles = None;
            entry.permissions = None;
        }
    }

    /// Drop the cached permission set for one subject.
    pub fn invalidate_permissions(&mut self, subject: SubjectId) {
        if let Some(entry) = self.entries.get_mut(&subject) {
            entry.permissions = None;
        }
    }

    /// Drop everything cached for one subject.
    pub fn invalidate(&mut self, subject: SubjectId) {
        self.entries.remove(&subject);
    }

    /// Drop all cached entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::SlugNormalizer;

    #[test]
    fn starts_unresolved() {
        let mut cache = AuthorizationCache::new();
        let subject = SubjectId::new();
        let entry = cache.entry(subject);
        assert!(entry.roles.is_none());
        assert!(entry.permissions.is_none());
    }

    #[test]
    fn role_invalidation_also_drops_permissions() {
        let n = SlugNormalizer::default();
        let mut cache = AuthorizationCache::new();
        let subject = SubjectId::new();

        let entry = cache.entry(subject);
        entry.roles = Some(vec![Role::new("Admin", "admin", 1, &n)]);
        entry.permissions = Some(vec![Permission::new("Edit", "edit", &n)]);

        cache.invalidate_roles(subject);
        let entry = cache.get(subject).unwrap();
        assert!(entry.roles.is_none());
        assert!(entry.permissions.is_none());
    }

    #[test]
    fn permission_invalidation_keeps_roles() {
        let n = SlugNormalizer::default();
        let mut cache = AuthorizationCache::new();
        let subject = SubjectId::new();

        let entry = cache.entry(subject);
        entry.roles = Some(vec![Role::new("Admin", "admin", 1, &n)]);
        entry.permissions = Some(vec![]);

        cache.invalidate_permissions(subject);
        let entry = cache.get(subject).unwrap();
        assert!(entry.roles.is_some());
        assert!(entry.permissions.is_none());
    }

    #[test]
    fn invalidation_is_per_subject() {
        let n = SlugNormalizer::default();
        let mut cache = AuthorizationCache::new();
        let a = SubjectId::new();
        let b = SubjectId::new();

        cache.entry(a).roles = Some(vec![Role::new("Admin", "admin", 1, &n)]);
        cache.entry(b).roles = Some(vec![Role::new("Editor", "editor", 1, &n)]);

        cache.invalidate(a);
        assert!(cache.get(a).is_none());
        assert!(cache.get(b).unwrap().roles.is_some());
    }
}
