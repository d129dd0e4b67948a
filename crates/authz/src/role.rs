//! Role model: a named, leveled group granting a set of permissions.

use serde::{Deserialize, Serialize};

use rolegate_core::{RoleId, Slug, SlugNormalizer};

/// A role that can be assigned to subjects.
///
/// # Invariants
/// - `slug` is unique across roles and always in normalized form.
///   Re-assigning the slug re-normalizes it ([`Role::set_slug`]).
/// - `level` ranks the role in the hierarchy: subjects inherit the
///   permissions of all roles leveled strictly below their own maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub level: i32,
}

impl Role {
    /// Create a role, normalizing the slug.
    pub fn new(
        name: impl Into<String>,
        slug: &str,
        level: i32,
        normalizer: &SlugNormalizer,
    ) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            slug: normalizer.normalize(slug),
            description: None,
            level,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Re-assign the slug attribute. The raw value is normalized, so the
    /// stored slug is always canonical.
    pub fn set_slug(&mut self, raw: &str, normalizer: &SlugNormalizer) {
        self.slug = normalizer.normalize(raw);
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug.as_str())
    }
}

/// Lookup reference to a role: by id or by (possibly un-normalized) slug.
///
/// An unresolvable reference is "no match" in every boolean check, never an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRef {
    Id(RoleId),
    Slug(String),
}

impl From<RoleId> for RoleRef {
    fn from(value: RoleId) -> Self {
        Self::Id(value)
    }
}

impl From<&Role> for RoleRef {
    fn from(value: &Role) -> Self {
        Self::Id(value.id)
    }
}

impl From<&str> for RoleRef {
    fn from(value: &str) -> Self {
        Self::Slug(value.to_string())
    }
}

impl From<String> for RoleRef {
    fn from(value: String) -> Self {
        Self::Slug(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_normalized_on_construction() {
        let n = SlugNormalizer::default();
        let role = Role::new("Admin Users", "Admin Users", 5, &n);
        assert_eq!(role.slug.as_str(), "admin.users");
        assert_eq!(role.name, "Admin Users");
    }

    #[test]
    fn set_slug_re_normalizes() {
        let n = SlugNormalizer::default();
        let mut role = Role::new("Editor", "editor", 1, &n);
        role.set_slug("Senior  Editor", &n);
        assert_eq!(role.slug.as_str(), "senior.editor");
    }

    #[test]
    fn role_ref_conversions() {
        let n = SlugNormalizer::default();
        let role = Role::new("Admin", "admin", 5, &n);
        assert_eq!(RoleRef::from(&role), RoleRef::Id(role.id));
        assert_eq!(RoleRef::from("admin"), RoleRef::Slug("admin".into()));
    }
}
