//! Per-user override rules layered on top of baseline role grants.

use crate::types::RuleAction;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Wildcard subject matching any resource type.
pub const SUBJECT_ALL: &str = "all";

/// A single stored grant or revoke statement belonging to one user.
///
/// Rules are applied in storage order on top of the baseline grants the
/// user's role provides; a later rule overrides earlier ones for the same
/// action/subject pairing. An `inverted` rule revokes instead of granting.
///
/// The optional `condition` narrows the rule to resource instances whose
/// fields match the serialized JSON object. It is carried as raw text here
/// and parsed exactly once when the ability is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Unique identifier for this rule (ULID)
    pub id: String,

    /// The user this rule belongs to
    pub user_id: String,

    /// The action being granted or revoked
    pub action: RuleAction,

    /// Resource type tag, or [`SUBJECT_ALL`] for any resource
    pub subject: String,

    /// Optional JSON object narrowing the rule to matching instances
    pub condition: Option<String>,

    /// When true the rule revokes instead of grants
    pub inverted: bool,

    /// Free-text justification, for diagnostics only
    pub reason: Option<String>,
}

impl PermissionRule {
    /// Creates a rule granting `action` on `subject` for `user_id`.
    pub fn grant(user_id: impl Into<String>, action: RuleAction, subject: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            user_id: user_id.into(),
            action,
            subject: subject.into(),
            condition: None,
            inverted: false,
            reason: None,
        }
    }

    /// Creates a rule revoking `action` on `subject` for `user_id`.
    pub fn revoke(
        user_id: impl Into<String>,
        action: RuleAction,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            inverted: true,
            ..Self::grant(user_id, action, subject)
        }
    }

    /// Attaches a serialized JSON condition to this rule.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Attaches a free-text justification to this rule.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
