//! Boundary contract between the authorization engine and rule storage.

use crate::error::Result;
use crate::rule::PermissionRule;
use async_trait::async_trait;

/// Read access to a user's stored override rules.
///
/// Implementations must return rules in storage (insertion) order; the
/// ability builder applies them in exactly the order received and later
/// rules take precedence over earlier ones. Storage failures surface as
/// [`crate::PermissionError::Storage`] and abort the ability build.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Returns every override rule belonging to `user_id`, oldest first.
    async fn find_user_permissions(&self, user_id: &str) -> Result<Vec<PermissionRule>>;
}
