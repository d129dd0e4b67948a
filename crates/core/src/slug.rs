//! Slug normalization: canonical identifiers for roles and permissions.
//!
//! A slug is the lowercase, separator-joined form of a human-readable name
//! ("Admin Users" becomes "admin.users"). Normalization is applied whenever
//! a slug attribute is set, whenever a role/permission is looked up by slug,
//! and on every atom inside a rule expression, so all comparisons happen in
//! canonical form.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Characters treated as word boundaries in addition to whitespace.
const BOUNDARY_CHARS: [char; 4] = ['.', '-', '_', '/'];

/// A normalized, separator-joined identifier. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Slug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes free-form identifiers with a configurable separator.
///
/// Normalization lowercases the input and collapses every run of whitespace
/// or boundary characters into a single separator. It is idempotent:
/// normalizing an already-normalized slug is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugNormalizer {
    separator: char,
}

impl Default for SlugNormalizer {
    fn default() -> Self {
        Self { separator: '.' }
    }
}

impl SlugNormalizer {
    /// Create a normalizer with the given separator.
    ///
    /// Alphanumeric or whitespace separators would make normalization
    /// ambiguous (and non-idempotent), so they are rejected up front.
    pub fn new(separator: char) -> DomainResult<Self> {
        if separator.is_alphanumeric() || separator.is_whitespace() {
            return Err(DomainError::configuration(format!(
                "slug separator {separator:?} must not be alphanumeric or whitespace"
            )));
        }
        Ok(Self { separator })
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Normalize a free-form identifier into canonical slug form.
    pub fn normalize(&self, raw: &str) -> Slug {
        let mut out = String::with_capacity(raw.len());
        let mut pending_separator = false;

        for c in raw.trim().chars() {
            let is_boundary =
                c.is_whitespace() || c == self.separator || BOUNDARY_CHARS.contains(&c);
            if is_boundary {
                pending_separator = !out.is_empty();
                continue;
            }
            if pending_separator {
                out.push(self.separator);
                pending_separator = false;
            }
            out.extend(c.to_lowercase());
        }

        Slug(out)
    }
}
