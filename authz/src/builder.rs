//! Builds a principal's [`Ability`] from role baselines and stored overrides.

use crate::ability::{Ability, AbilityRule};
use crate::error::Result;
use permission_cache::PermissionCache;
use permissions::{PermissionRepository, PermissionRule, Principal, Role, RuleAction, SUBJECT_ALL};
use std::sync::Arc;
use tracing::debug;

/// Produces the decision object for a principal.
///
/// Baseline grants come from a fixed role table; override rules come from
/// the cache, falling back to the repository on a miss. Two concurrent
/// builds for the same principal may both miss and both fetch; the second
/// cache write simply replaces the first, which is harmless.
pub struct AbilityBuilder {
    repository: Arc<dyn PermissionRepository>,
    cache: Arc<PermissionCache>,
}

impl AbilityBuilder {
    pub fn new(repository: Arc<dyn PermissionRepository>, cache: Arc<PermissionCache>) -> Self {
        Self { repository, cache }
    }

    /// Build the immutable ability for `principal`.
    ///
    /// Overrides are applied in storage order after the baseline grants,
    /// so a stored rule always takes precedence over the baseline and a
    /// later stored rule over an earlier one. A repository failure aborts
    /// the build; no partial ability is returned.
    pub async fn build(&self, principal: &Principal) -> Result<Ability> {
        let mut rules = Vec::new();

        match principal.role {
            Role::Administrator => {
                rules.push(AbilityRule::baseline(RuleAction::Manage, SUBJECT_ALL));
            }
            Role::Editor => {
                rules.push(AbilityRule::baseline(RuleAction::Read, SUBJECT_ALL));
            }
            Role::StandardUser => {
                rules.push(AbilityRule::baseline(RuleAction::Read, SUBJECT_ALL));
            }
        }

        let overrides = self.user_rules(&principal.id).await?;
        for stored in &overrides {
            rules.push(AbilityRule::from_stored(stored));
        }

        debug!(
            "Built ability for user_id={} role={} ({} rules)",
            principal.id,
            principal.role,
            rules.len()
        );

        Ok(Ability::new(rules))
    }

    /// The principal's override rules, from cache or storage.
    async fn user_rules(&self, user_id: &str) -> Result<Vec<PermissionRule>> {
        if let Some(rules) = self.cache.get(user_id).await {
            return Ok(rules);
        }

        debug!("Fetching permission rules from storage: user_id={}", user_id);
        let rules = self.repository.find_user_permissions(user_id).await?;
        self.cache.put(user_id, rules.clone()).await;

        Ok(rules)
    }

    /// The cache backing this builder, for invalidation and stats.
    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }
}
