//! Domain error model.

use thiserror::Error;

/// Result type used across the authorization core.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Boolean authorization checks never surface `NotFound`: an unresolved
/// slug/id means "condition not satisfied" and evaluates to `false`. The
/// only errors callers of the decision API see are `MalformedRule` and
/// `Configuration`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Startup-time misconfiguration (e.g. an unusable slug separator).
    /// Raised when the engine is constructed, never per-check.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A rule expression with unparseable syntax. This indicates a
    /// programming mistake by the caller, not a runtime authorization
    /// outcome, so it fails fast instead of evaluating to `false`.
    #[error("malformed rule: {0}")]
    MalformedRule(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested role/permission was not found. Internal: boolean checks
    /// translate this to `false`.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn malformed_rule(msg: impl Into<String>) -> Self {
        Self::MalformedRule(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
