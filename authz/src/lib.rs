//! Attribute-based authorization engine.
//!
//! This crate combines role-derived baseline grants with per-user override
//! rules (including inverted "deny" rules and JSON-encoded conditions)
//! into an immutable, queryable [`Ability`], and gates operations on
//! declaratively attached permission requirements.
//!
//! # Architecture Overview
//!
//! The authorization flow follows this pattern:
//!
//! 1. **Request arrives** at the transport layer
//! 2. **Authentication** places the principal on the request context
//! 3. **The guard** reads the operation's required rules
//! 4. **AbilityBuilder** assembles the principal's ability — baseline
//!    grants by role, then stored overrides from the permission cache,
//!    falling back to the repository on a miss
//! 5. **Decision** is made: every required rule must hold or the
//!    operation is rejected
//!
//! Rules compose in application order and the last matching rule wins, so
//! a stored override always beats the baseline and later rules beat
//! earlier ones. With no matching rule the default is deny.
//!
//! # Example
//!
//! ```no_run
//! use authz::{
//!     required_rules, AbilityBuilder, AuthorizationGuard, ContextPrincipalResolver,
//!     Principal, RequestContext, RequiredRule,
//! };
//! use permission_cache::PermissionCache;
//! use permission_store::{PermissionDatabase, PermissionStoreConfig};
//! use std::sync::Arc;
//!
//! static DELETE_USER: &[RequiredRule] = required_rules![(Delete, "User")];
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(PermissionDatabase::new(PermissionStoreConfig::default()).await?);
//! let cache = Arc::new(PermissionCache::with_defaults());
//! let builder = AbilityBuilder::new(store, cache);
//! let guard = AuthorizationGuard::new(builder, Arc::new(ContextPrincipalResolver));
//!
//! let ctx = RequestContext::authenticated(Principal::administrator("admin"));
//! guard.authorize(DELETE_USER, &ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod ability;
pub mod builder;
pub mod error;
pub mod guard;

#[cfg(test)]
mod guard_scenarios;

pub use ability::Ability;
pub use builder::AbilityBuilder;
pub use error::{AuthzError, Result};
pub use guard::{
    AuthorizationGuard, ContextPrincipalResolver, PrincipalResolver, RequestContext, RequiredRule,
};

// Re-export the shared domain types so embedding code only needs this crate
pub use permissions::{PermissionRule, Principal, Role, RuleAction, SUBJECT_ALL};
