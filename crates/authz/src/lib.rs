//! `rolegate-authz` — role-and-permission authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: persistence
//! is an injected collaborator ([`store::AuthorizationStore`]), and every
//! decision entry point returns a plain boolean. Subjects hold roles, roles
//! grant permissions, and checks can be scoped to a concrete resource
//! instance (owner checks).

pub mod cache;
pub mod config;
pub mod engine;
pub mod permission;
pub mod pretend;
pub mod role;
pub mod rule;
pub mod store;

pub use cache::AuthorizationCache;
pub use config::AuthzConfig;
pub use engine::{AuthorizationEngine, Resource, DEFAULT_OWNER_FIELD};
pub use permission::{Permission, PermissionRef};
pub use pretend::{CheckKind, PretendConfig, PretendOptions};
pub use role::{Role, RoleRef};
pub use rule::{Atom, AtomKind, Rule, RuleExpr};
pub use store::{AuthorizationStore, InMemoryStore};
