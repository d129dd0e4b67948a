//! The authorization engine: role/permission membership, level computation,
//! rule evaluation, and entity-scoped checks.
//!
//! The engine owns the per-subject cache and an injected
//! [`AuthorizationStore`]; construction validates the configuration up
//! front, so decision calls never fail on configuration. Reads take
//! `&mut self` because they populate the cache; the execution model is
//! single-threaded and request-scoped (one engine per in-flight request in
//! a multi-threaded host).

use tracing::{debug, info};

use rolegate_core::{DomainError, DomainResult, SlugNormalizer, SubjectId};

use crate::cache::AuthorizationCache;
use crate::config::AuthzConfig;
use crate::permission::{Permission, PermissionRef};
use crate::pretend::{CheckKind, PretendConfig};
use crate::role::{Role, RoleRef};
use crate::rule::{Atom, AtomKind, Rule, RuleExpr};
use crate::store::AuthorizationStore;

/// Default owner column for entity-scoped checks.
pub const DEFAULT_OWNER_FIELD: &str = "user_id";

/// A resource instance that entity-scoped (`allowed`) checks can target.
///
/// `entity_type` must match the `model` field of the permissions guarding
/// this resource; `owner` exposes the owning subject under a named field
/// for the owner bypass.
pub trait Resource {
    fn entity_type(&self) -> &str;

    fn owner(&self, field: &str) -> Option<SubjectId>;
}

/// Which membership an unprefixed rule atom tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalContext {
    Role,
    Permission,
}

/// Role-and-permission authorization engine.
pub struct AuthorizationEngine<S: AuthorizationStore> {
    store: S,
    cache: AuthorizationCache,
    normalizer: SlugNormalizer,
    pretend: PretendConfig,
}

impl<S: AuthorizationStore> AuthorizationEngine<S> {
    /// Build an engine. Fails fast on configuration errors (unusable slug
    /// separator); decision calls afterwards never see configuration
    /// failures.
    pub fn new(store: S, config: AuthzConfig) -> DomainResult<Self> {
        let normalizer = config.normalizer()?;
        Ok(Self {
            store,
            cache: AuthorizationCache::new(),
            normalizer,
            pretend: config.pretend,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn normalizer(&self) -> &SlugNormalizer {
        &self.normalizer
    }

    // ─────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────

    /// The subject's roles, loaded from the store on first access and
    /// cached until the next role mutation.
    pub fn roles(&mut self, subject: SubjectId) -> &[Role] {
        let store = &self.store;
        self.cache
            .entry(subject)
            .roles
            .get_or_insert_with(|| {
                debug!(subject = %subject, "loading roles from store");
                store.roles_for_subject(subject)
            })
            .as_slice()
    }

    /// Membership test. The reference is resolved through the store first
    /// (slugs normalized); an unresolvable reference is `false`, never an
    /// error.
    pub fn has_role(&mut self, subject: SubjectId, role: impl Into<RoleRef>) -> bool {
        let Some(role) = self.resolve_role(role.into()) else {
            return false;
        };
        self.roles(subject).iter().any(|r| r.id == role.id)
    }

    /// The subject's hierarchy level: the maximum `level` across assigned
    /// roles, `0` with no roles.
    pub fn level(&mut self, subject: SubjectId) -> i32 {
        self.roles(subject).iter().map(|r| r.level).max().unwrap_or(0)
    }

    /// Evaluate a role rule: OR over comma groups, AND within a group.
    /// Unprefixed atoms are role checks; an explicit `p:` atom is honored
    /// as a permission check. Pretend-aware.
    pub fn is(&mut self, subject: SubjectId, rules: impl Into<RuleExpr>) -> DomainResult<bool> {
        if let Some(answer) = self.pretend.answer(CheckKind::Is) {
            return Ok(answer);
        }
        let rule = Rule::parse(&rules.into(), &self.normalizer)?;
        Ok(self.evaluate_rule(subject, &rule, EvalContext::Role))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────

    /// Permissions granted through roles.
    ///
    /// This is the union of the permissions of every role the subject holds
    /// and the permissions of every role leveled strictly below the
    /// subject's own level. The second half is deliberate hierarchical
    /// inheritance: a high-level subject gains lower-leveled roles'
    /// permissions without being assigned those roles.
    pub fn role_permissions(&mut self, subject: SubjectId) -> Vec<Permission> {
        let level = self.level(subject);
        let mut role_ids: Vec<_> = self.roles(subject).iter().map(|r| r.id).collect();
        for id in self.store.role_ids_below_level(level) {
            if !role_ids.contains(&id) {
                role_ids.push(id);
            }
        }
        self.store.permissions_for_roles(&role_ids)
    }

    /// All effective permissions: role permissions merged with permissions
    /// attached to the subject directly, deduplicated by id. Cached until
    /// the next role or permission mutation.
    pub fn permissions(&mut self, subject: SubjectId) -> &[Permission] {
        if self.cache.entry(subject).permissions.is_none() {
            debug!(subject = %subject, "loading permissions from store");
            let mut merged = self.role_permissions(subject);
            for permission in self.store.direct_permissions_for_subject(subject) {
                if !merged.iter().any(|p| p.id == permission.id) {
                    merged.push(permission);
                }
            }
            self.cache.entry(subject).permissions = Some(merged);
        }
        match &self.cache.entry(subject).permissions {
            Some(permissions) => permissions.as_slice(),
            None => &[],
        }
    }

    /// Membership test against the effective permission set. Unresolvable
    /// references are `false`.
    pub fn has_permission(
        &mut self,
        subject: SubjectId,
        permission: impl Into<PermissionRef>,
    ) -> bool {
        let Some(permission) = self.resolve_permission(permission.into()) else {
            return false;
        };
        self.permissions(subject).iter().any(|p| p.id == permission.id)
    }

    /// Evaluate a permission rule. Unprefixed atoms are permission checks;
    /// an explicit `r:` atom is honored as a role check. Pretend-aware.
    pub fn can(&mut self, subject: SubjectId, rules: impl Into<RuleExpr>) -> DomainResult<bool> {
        if let Some(answer) = self.pretend.answer(CheckKind::Can) {
            return Ok(answer);
        }
        let rule = Rule::parse(&rules.into(), &self.normalizer)?;
        Ok(self.evaluate_rule(subject, &rule, EvalContext::Permission))
    }

    /// Evaluate a mixed role/permission rule. Every atom must carry an
    /// explicit `r:` or `p:` prefix; an unprefixed atom is a caller error.
    /// Pretend-aware.
    pub fn has(&mut self, subject: SubjectId, rules: impl Into<RuleExpr>) -> DomainResult<bool> {
        if let Some(answer) = self.pretend.answer(CheckKind::Has) {
            return Ok(answer);
        }
        let rule = Rule::parse(&rules.into(), &self.normalizer)?;
        if rule.atoms().any(|a| a.kind == AtomKind::Contextual) {
            return Err(DomainError::malformed_rule(
                "atoms in a mixed rule must carry an \"r:\" or \"p:\" prefix",
            ));
        }
        Ok(self.evaluate_rule(subject, &rule, EvalContext::Role))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entity-scoped checks
    // ─────────────────────────────────────────────────────────────────────

    /// Entity-scoped rule check with the default owner bypass
    /// (`user_id` field). See [`Self::allowed_with`].
    pub fn allowed(
        &mut self,
        subject: SubjectId,
        rules: impl Into<RuleExpr>,
        entity: &impl Resource,
    ) -> DomainResult<bool> {
        self.allowed_with(subject, rules, entity, true, DEFAULT_OWNER_FIELD)
    }

    /// Entity-scoped rule check.
    ///
    /// When `owner_check` is set and the entity's `owner_field` resolves to
    /// the acting subject, the check passes immediately regardless of the
    /// rule. Otherwise each atom is evaluated with [`Self::is_allowed`]
    /// against the entity. Pretend-aware.
    pub fn allowed_with(
        &mut self,
        subject: SubjectId,
        rules: impl Into<RuleExpr>,
        entity: &impl Resource,
        owner_check: bool,
        owner_field: &str,
    ) -> DomainResult<bool> {
        if let Some(answer) = self.pretend.answer(CheckKind::Allowed) {
            return Ok(answer);
        }
        if owner_check && entity.owner(owner_field) == Some(subject) {
            debug!(subject = %subject, entity = entity.entity_type(), "owner bypass");
            return Ok(true);
        }
        let rule = Rule::parse(&rules.into(), &self.normalizer)?;
        Ok(rule.evaluate(|atom| {
            let slug = atom.slug.as_str().to_string();
            self.is_allowed(subject, PermissionRef::Slug(slug), entity)
        }))
    }

    /// Whether one permission authorizes the subject against a concrete
    /// entity: the permission must be scoped (`model` set) to the entity's
    /// type and match the reference by id or slug. First match wins; no
    /// match is `false`.
    pub fn is_allowed(
        &mut self,
        subject: SubjectId,
        permission: impl Into<PermissionRef>,
        entity: &impl Resource,
    ) -> bool {
        let permission = self.normalize_ref(permission.into());
        self.permissions(subject).iter().any(|p| {
            p.model.as_deref() == Some(entity.entity_type())
                && match &permission {
                    PermissionRef::Id(id) => p.id == *id,
                    PermissionRef::Slug(slug) => p.slug.as_str() == slug,
                }
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Attach a role. Idempotent; invalidates the subject's cached roles
    /// (and the permission set derived from them).
    pub fn attach_role(
        &mut self,
        subject: SubjectId,
        role: impl Into<RoleRef>,
    ) -> DomainResult<()> {
        let role = self.resolve_role(role.into()).ok_or(DomainError::NotFound)?;
        self.store.attach_role(subject, role.id);
        self.cache.invalidate_roles(subject);
        info!(subject = %subject, role = %role.slug, "role attached");
        Ok(())
    }

    /// Detach a role; invalidates the subject's cached roles.
    pub fn detach_role(
        &mut self,
        subject: SubjectId,
        role: impl Into<RoleRef>,
    ) -> DomainResult<()> {
        let role = self.resolve_role(role.into()).ok_or(DomainError::NotFound)?;
        self.store.detach_role(subject, Some(role.id));
        self.cache.invalidate_roles(subject);
        info!(subject = %subject, role = %role.slug, "role detached");
        Ok(())
    }

    /// Detach every role from the subject.
    pub fn detach_all_roles(&mut self, subject: SubjectId) {
        self.store.detach_role(subject, None);
        self.cache.invalidate_roles(subject);
        info!(subject = %subject, "all roles detached");
    }

    /// Attach a direct permission. Idempotent; invalidates the subject's
    /// cached permission set.
    pub fn attach_permission(
        &mut self,
        subject: SubjectId,
        permission: impl Into<PermissionRef>,
    ) -> DomainResult<()> {
        let permission = self
            .resolve_permission(permission.into())
            .ok_or(DomainError::NotFound)?;
        self.store.attach_permission(subject, permission.id);
        self.cache.invalidate_permissions(subject);
        info!(subject = %subject, permission = %permission.slug, "permission attached");
        Ok(())
    }

    /// Detach a direct permission; invalidates the subject's cached
    /// permission set.
    pub fn detach_permission(
        &mut self,
        subject: SubjectId,
        permission: impl Into<PermissionRef>,
    ) -> DomainResult<()> {
        let permission = self
            .resolve_permission(permission.into())
            .ok_or(DomainError::NotFound)?;
        self.store.detach_permission(subject, Some(permission.id));
        self.cache.invalidate_permissions(subject);
        info!(subject = %subject, permission = %permission.slug, "permission detached");
        Ok(())
    }

    /// Detach every direct permission from the subject.
    pub fn detach_all_permissions(&mut self, subject: SubjectId) {
        self.store.detach_permission(subject, None);
        self.cache.invalidate_permissions(subject);
        info!(subject = %subject, "all permissions detached");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_role(&self, role: RoleRef) -> Option<Role> {
        let role = match role {
            RoleRef::Slug(raw) => {
                RoleRef::Slug(self.normalizer.normalize(&raw).as_str().to_string())
            }
            id => id,
        };
        self.store.find_role(&role)
    }

    fn resolve_permission(&self, permission: PermissionRef) -> Option<Permission> {
        let permission = self.normalize_ref(permission);
        self.store.find_permission(&permission)
    }

    fn normalize_ref(&self, permission: PermissionRef) -> PermissionRef {
        match permission {
            PermissionRef::Slug(raw) => {
                PermissionRef::Slug(self.normalizer.normalize(&raw).as_str().to_string())
            }
            id => id,
        }
    }

    fn evaluate_rule(&mut self, subject: SubjectId, rule: &Rule, context: EvalContext) -> bool {
        rule.evaluate(|atom| self.atom_holds(subject, atom, context))
    }

    fn atom_holds(&mut self, subject: SubjectId, atom: &Atom, context: EvalContext) -> bool {
        let slug = atom.slug.as_str().to_string();
        match (atom.kind, context) {
            (AtomKind::Role, _) | (AtomKind::Contextual, EvalContext::Role) => {
                self.has_role(subject, RoleRef::Slug(slug))
            }
            (AtomKind::Permission, _) | (AtomKind::Contextual, EvalContext::Permission) => {
                self.has_permission(subject, PermissionRef::Slug(slug))
            }
        }
    }
}
