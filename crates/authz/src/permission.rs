//! Permission model: a named capability, optionally scoped to one entity
//! type for instance-level ("allowed") checks.

use serde::{Deserialize, Serialize};

use rolegate_core::{PermissionId, Slug, SlugNormalizer};

/// A grantable capability.
///
/// `model` carries the entity type name this permission is restricted to.
/// Permissions without a `model` participate in plain `can` checks only;
/// entity-scoped `allowed` checks match solely against permissions whose
/// `model` equals the target entity's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub model: Option<String>,
}

impl Permission {
    /// Create a permission, normalizing the slug.
    pub fn new(name: impl Into<String>, slug: &str, normalizer: &SlugNormalizer) -> Self {
        Self {
            id: PermissionId::new(),
            name: name.into(),
            slug: normalizer.normalize(slug),
            description: None,
            model: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict this permission to one entity type (enables `allowed`
    /// matching against instances of that type).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Re-assign the slug attribute, normalizing the raw value.
    pub fn set_slug(&mut self, raw: &str, normalizer: &SlugNormalizer) {
        self.slug = normalizer.normalize(raw);
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug.as_str())
    }
}

/// Lookup reference to a permission: by id or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionRef {
    Id(PermissionId),
    Slug(String),
}

impl From<PermissionId> for PermissionRef {
    fn from(value: PermissionId) -> Self {
        Self::Id(value)
    }
}

impl From<&Permission> for PermissionRef {
    fn from(value: &Permission) -> Self {
        Self::Id(value.id)
    }
}

impl From<&str> for PermissionRef {
    fn from(value: &str) -> Self {
        Self::Slug(value.to_string())
    }
}

impl From<String> for PermissionRef {
    fn from(value: String) -> Self {
        Self::Slug(value)
    }
}
