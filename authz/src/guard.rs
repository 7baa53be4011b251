//! Gates operations on declaratively attached permission requirements.
//!
//! Calling code attaches a static list of [`RequiredRule`]s to each
//! protected operation (the [`required_rules!`] macro is the usual way)
//! and the surrounding transport hands that list to
//! [`AuthorizationGuard::authorize`] together with the request context.
//! The guard resolves the principal, builds its ability, and checks every
//! required rule.

use crate::ability::Ability;
use crate::builder::AbilityBuilder;
use crate::error::{AuthzError, Result};
use permissions::{Principal, RuleAction};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One permission an operation requires.
///
/// `const`-constructible so operations can declare their requirements as
/// `static` metadata next to the handler they protect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredRule {
    pub action: RuleAction,
    pub subject: &'static str,
}

impl RequiredRule {
    pub const fn new(action: RuleAction, subject: &'static str) -> Self {
        Self { action, subject }
    }
}

/// Declares the permissions an operation requires.
///
/// ```
/// use authz::{required_rules, RequiredRule};
///
/// static DELETE_USER: &[RequiredRule] = required_rules![(Delete, "User")];
/// static MODERATE: &[RequiredRule] = required_rules![(Update, "Post"), (Delete, "Comment")];
/// ```
#[macro_export]
macro_rules! required_rules {
    [$(($action:ident, $subject:expr)),* $(,)?] => {
        &[$($crate::RequiredRule::new($crate::RuleAction::$action, $subject)),*]
    };
}

/// Per-request state the guard reads.
///
/// The authentication layer fills in the principal before the guard runs;
/// the request id only labels log lines.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub request_id: Option<String>,
}

impl RequestContext {
    /// A context carrying an authenticated principal.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            request_id: None,
        }
    }

    /// A context with no authenticated principal.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Seam to the authentication layer: extracts the current principal from
/// a request context.
pub trait PrincipalResolver: Send + Sync {
    fn resolve(&self, ctx: &RequestContext) -> Option<Principal>;
}

/// Resolver reading the principal the authentication layer already placed
/// on the context.
pub struct ContextPrincipalResolver;

impl PrincipalResolver for ContextPrincipalResolver {
    fn resolve(&self, ctx: &RequestContext) -> Option<Principal> {
        ctx.principal.clone()
    }
}

/// Enforces required permissions for inbound operations.
///
/// Stateless across calls apart from the cache inside the builder. Every
/// decision is logged; denied callers only ever see [`AuthzError::Forbidden`]
/// with no rule detail.
pub struct AuthorizationGuard {
    builder: AbilityBuilder,
    resolver: Arc<dyn PrincipalResolver>,
}

impl AuthorizationGuard {
    pub fn new(builder: AbilityBuilder, resolver: Arc<dyn PrincipalResolver>) -> Self {
        Self { builder, resolver }
    }

    /// Allow or deny an operation carrying `required` permissions.
    ///
    /// An empty requirement list allows unconditionally without resolving
    /// a principal or building an ability. Otherwise every required rule
    /// must hold against the principal's ability.
    pub async fn authorize(&self, required: &[RequiredRule], ctx: &RequestContext) -> Result<()> {
        if required.is_empty() {
            debug!("No permissions required, allowing");
            return Ok(());
        }

        let principal = self
            .resolver
            .resolve(ctx)
            .ok_or(AuthzError::Unauthenticated)?;

        let ability = match self.builder.build(&principal).await {
            Ok(ability) => ability,
            Err(e) => {
                error!(
                    "Permission check failed for user_id={} request_id={:?}: {}",
                    principal.id, ctx.request_id, e
                );
                return Err(e);
            }
        };

        self.evaluate(&principal, &ability, required)
    }

    fn evaluate(
        &self,
        principal: &Principal,
        ability: &Ability,
        required: &[RequiredRule],
    ) -> Result<()> {
        for rule in required {
            if !ability.can(rule.action, rule.subject) {
                warn!(
                    "Access denied for user_id={}: {} on {}",
                    principal.id, rule.action, rule.subject
                );
                return Err(AuthzError::Forbidden);
            }
        }

        info!(
            "Access allowed for user_id={} ({} rules checked)",
            principal.id,
            required.len()
        );
        Ok(())
    }

    /// The permission cache behind this guard, for invalidation and stats.
    pub fn cache(&self) -> &Arc<permission_cache::PermissionCache> {
        self.builder.cache()
    }
}
