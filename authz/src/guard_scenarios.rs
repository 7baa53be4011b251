//! End-to-end authorization scenarios.
//!
//! These tests run the full stack — SQLite-backed rule storage, the
//! permission cache, the ability builder, and the guard — the way an
//! embedding application wires it at startup.

#[cfg(test)]
mod tests {
    use crate::{
        required_rules, AbilityBuilder, AuthorizationGuard, AuthzError,
        ContextPrincipalResolver, Principal, RequestContext, RequiredRule, Role, RuleAction,
    };
    use permission_cache::{CacheConfig, PermissionCache};
    use permission_store::{PermissionDatabase, PermissionStoreConfig};
    use permissions::PermissionRule;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn stack() -> (TempDir, Arc<PermissionDatabase>, AuthorizationGuard) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            PermissionDatabase::new(PermissionStoreConfig {
                database_path: dir.path().join("permissions.db"),
                ..PermissionStoreConfig::default()
            })
            .await
            .unwrap(),
        );
        let cache = Arc::new(PermissionCache::with_defaults());
        let builder = AbilityBuilder::new(store.clone(), cache);
        let guard = AuthorizationGuard::new(builder, Arc::new(ContextPrincipalResolver));
        (dir, store, guard)
    }

    #[tokio::test]
    async fn test_standard_user_with_create_override() {
        let (_dir, store, guard) = stack().await;
        store
            .create_rule(&PermissionRule::grant("u1", RuleAction::Create, "Post"))
            .await
            .unwrap();

        let ctx = RequestContext::authenticated(Principal::standard_user("u1"));

        // Baseline read everywhere, plus the granted create
        guard
            .authorize(required_rules![(Read, "all")], &ctx)
            .await
            .unwrap();
        guard
            .authorize(required_rules![(Create, "Post")], &ctx)
            .await
            .unwrap();

        // Nothing granted update
        let err = guard
            .authorize(required_rules![(Update, "Post")], &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden));
    }

    #[tokio::test]
    async fn test_empty_requirements_allow_any_caller() {
        let (_dir, _store, guard) = stack().await;

        guard
            .authorize(&[], &RequestContext::anonymous())
            .await
            .unwrap();
        guard
            .authorize(
                &[],
                &RequestContext::authenticated(Principal::standard_user("u1")),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_user_requires_more_than_standard_role() {
        let (_dir, _store, guard) = stack().await;
        static DELETE_USER: &[RequiredRule] = required_rules![(Delete, "User")];

        let ctx = RequestContext::authenticated(Principal::standard_user("u1"));
        let err = guard.authorize(DELETE_USER, &ctx).await.unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden));

        let ctx = RequestContext::authenticated(Principal::administrator("root"));
        guard.authorize(DELETE_USER, &ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_editor_loses_read_on_revoked_subject() {
        let (_dir, store, guard) = stack().await;
        store
            .create_rule(&PermissionRule::revoke("e1", RuleAction::Read, "Post"))
            .await
            .unwrap();

        let ctx = RequestContext::authenticated(Principal::new("e1", Role::Editor));

        let err = guard
            .authorize(required_rules![(Read, "Post")], &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden));

        guard
            .authorize(required_rules![(Read, "User")], &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rule_change_invisible_until_invalidated() {
        let (_dir, store, guard) = stack().await;
        let ctx = RequestContext::authenticated(Principal::standard_user("u1"));

        // First check caches the (empty) rule list
        let err = guard
            .authorize(required_rules![(Create, "Post")], &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden));

        // Granting the rule does not invalidate the cache on its own;
        // the stale decision persists until the entry is dropped.
        store
            .create_rule(&PermissionRule::grant("u1", RuleAction::Create, "Post"))
            .await
            .unwrap();
        let err = guard
            .authorize(required_rules![(Create, "Post")], &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden));

        guard.cache().invalidate("u1").await;
        guard
            .authorize(required_rules![(Create, "Post")], &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_cache_picks_up_new_rules() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            PermissionDatabase::new(PermissionStoreConfig {
                database_path: dir.path().join("permissions.db"),
                ..PermissionStoreConfig::default()
            })
            .await
            .unwrap(),
        );
        let cache = Arc::new(PermissionCache::new(CacheConfig {
            ttl_seconds: 0,
            ..CacheConfig::default()
        }));
        let builder = AbilityBuilder::new(store.clone(), cache);
        let guard = AuthorizationGuard::new(builder, Arc::new(ContextPrincipalResolver));
        let ctx = RequestContext::authenticated(Principal::standard_user("u1"));

        let err = guard
            .authorize(required_rules![(Create, "Post")], &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden));

        // With a zero TTL every check refetches, so the new rule is
        // visible immediately.
        store
            .create_rule(&PermissionRule::grant("u1", RuleAction::Create, "Post"))
            .await
            .unwrap();
        guard
            .authorize(required_rules![(Create, "Post")], &ctx)
            .await
            .unwrap();
    }
}
