//! `rolegate-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or transport
//! concerns): strongly-typed identifiers, the domain error model, and slug
//! normalization.

pub mod error;
pub mod id;
pub mod slug;

pub use error::{DomainError, DomainResult};
pub use id::{PermissionId, RoleId, SubjectId};
pub use slug::{Slug, SlugNormalizer};
