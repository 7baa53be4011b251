//! Core identity and action types for the permission system.
//!
//! A `Principal` is the authenticated identity making a request. It is
//! produced by the authentication layer and only read here; authorization
//! never mutates it. Roles are a small closed set and map to baseline
//! grants in the ability builder, while `RuleAction` enumerates the
//! operations a rule can grant or revoke.

use crate::error::PermissionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of roles a principal can hold.
///
/// Any role not explicitly recognized by the system is treated as
/// `StandardUser`, which is also the default for new accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Editor,
    #[default]
    StandardUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Editor => "editor",
            Role::StandardUser => "standard_user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Role::Administrator),
            "editor" => Ok(Role::Editor),
            "standard_user" => Ok(Role::StandardUser),
            other => Err(PermissionError::InvalidRole(other.to_string())),
        }
    }
}

/// An operation a permission rule can grant or revoke.
///
/// `Manage` subsumes every other action: a rule granting `Manage` on a
/// subject matches any action queried against that subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Manage,
    Create,
    Read,
    Update,
    Delete,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Manage => "manage",
            RuleAction::Create => "create",
            RuleAction::Read => "read",
            RuleAction::Update => "update",
            RuleAction::Delete => "delete",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleAction {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manage" => Ok(RuleAction::Manage),
            "create" => Ok(RuleAction::Create),
            "read" => Ok(RuleAction::Read),
            "update" => Ok(RuleAction::Update),
            "delete" => Ok(RuleAction::Delete),
            other => Err(PermissionError::InvalidAction(other.to_string())),
        }
    }
}

/// The authenticated identity an authorization check runs on behalf of.
///
/// Owned by the authentication layer; immutable for the duration of a
/// request. The `id` is opaque to the permission system and is only used
/// to key override-rule lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// The unique identifier for this principal (e.g., ULID for users)
    pub id: String,

    /// The role this principal holds
    pub role: Role,
}

impl Principal {
    /// Creates a new Principal with the given ID and role.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Creates a Principal with the Administrator role.
    pub fn administrator(id: impl Into<String>) -> Self {
        Self::new(id, Role::Administrator)
    }

    /// Creates a Principal with the Editor role.
    pub fn editor(id: impl Into<String>) -> Self {
        Self::new(id, Role::Editor)
    }

    /// Creates a Principal with the StandardUser role.
    pub fn standard_user(id: impl Into<String>) -> Self {
        Self::new(id, Role::StandardUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Administrator, Role::Editor, Role::StandardUser] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_role_is_standard_user() {
        assert_eq!(Role::default(), Role::StandardUser);
    }

    #[test]
    fn test_action_round_trip() {
        for action in [
            RuleAction::Manage,
            RuleAction::Create,
            RuleAction::Read,
            RuleAction::Update,
            RuleAction::Delete,
        ] {
            let parsed: RuleAction = action.as_str().parse().unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!("destroy".parse::<RuleAction>().is_err());
    }

    #[test]
    fn test_principal_helpers() {
        let principal = Principal::administrator("01H8XGJWBWBAQ4Z4M9D5K4Z3E1");
        assert_eq!(principal.role, Role::Administrator);

        let principal = Principal::editor("u2");
        assert_eq!(principal.role, Role::Editor);

        let principal = Principal::standard_user("u3");
        assert_eq!(principal.role, Role::StandardUser);
    }
}
