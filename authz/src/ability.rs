//! The immutable decision object built per principal.
//!
//! An [`Ability`] is an ordered list of tagged rules: baseline grants
//! derived from the principal's role followed by the user's stored
//! override rules. Queries walk the list and the last matching rule wins,
//! so an inverted rule appended later negates an earlier grant for the
//! same action/subject pairing. With no matching rule the answer is deny.

use permissions::{PermissionRule, RuleAction, SUBJECT_ALL};
use serde_json::{Map, Value};
use tracing::warn;

/// One evaluated rule inside an ability.
///
/// The condition, when present, has already been parsed from the stored
/// rule's JSON text; a rule whose condition failed to parse carries no
/// condition and therefore matches any instance. That widening is the
/// documented fail-open behavior of the rule format and is kept as-is.
#[derive(Debug, Clone)]
pub(crate) struct AbilityRule {
    action: RuleAction,
    subject: String,
    condition: Option<Map<String, Value>>,
    inverted: bool,
}

impl AbilityRule {
    /// A baseline grant derived from the principal's role.
    pub(crate) fn baseline(action: RuleAction, subject: &str) -> Self {
        Self {
            action,
            subject: subject.to_string(),
            condition: None,
            inverted: false,
        }
    }

    /// Convert a stored override rule, parsing its condition once.
    ///
    /// A condition that is not valid JSON, or not a JSON object, is
    /// dropped and the rule applies unconditionally.
    pub(crate) fn from_stored(rule: &PermissionRule) -> Self {
        let condition = rule.condition.as_deref().and_then(|raw| {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Some(map),
                Ok(other) => {
                    warn!(
                        "Condition on rule {} is not a JSON object ({}), applying rule without it",
                        rule.id, other
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        "Failed to parse condition on rule {}: {}, applying rule without it",
                        rule.id, e
                    );
                    None
                }
            }
        });

        Self {
            action: rule.action,
            subject: rule.subject.clone(),
            condition,
            inverted: rule.inverted,
        }
    }

    /// Whether this rule applies to the queried action/subject/instance.
    ///
    /// `Manage` matches any action and [`SUBJECT_ALL`] matches any
    /// subject. A conditioned rule only matches when an instance is
    /// supplied and every condition field equals the instance field.
    fn matches(&self, action: RuleAction, subject: &str, instance: Option<&Value>) -> bool {
        if self.action != RuleAction::Manage && self.action != action {
            return false;
        }
        if self.subject != SUBJECT_ALL && self.subject != subject {
            return false;
        }
        match &self.condition {
            None => true,
            Some(condition) => match instance {
                None => false,
                Some(instance) => condition
                    .iter()
                    .all(|(field, expected)| instance.get(field) == Some(expected)),
            },
        }
    }
}

/// A principal's complete, queryable permission set.
///
/// Immutable once built; freely shareable across concurrent readers.
#[derive(Debug, Clone)]
pub struct Ability {
    rules: Vec<AbilityRule>,
}

impl Ability {
    pub(crate) fn new(rules: Vec<AbilityRule>) -> Self {
        Self { rules }
    }

    /// Whether the principal may perform `action` on the given subject type.
    pub fn can(&self, action: RuleAction, subject: &str) -> bool {
        self.can_instance(action, subject, None)
    }

    /// Whether the principal may perform `action` on a concrete instance
    /// of the subject.
    ///
    /// The last rule matching the query decides the outcome; without a
    /// match the default is deny.
    pub fn can_instance(
        &self,
        action: RuleAction,
        subject: &str,
        instance: Option<&Value>,
    ) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(action, subject, instance))
            .map_or(false, |rule| !rule.inverted)
    }

    /// Number of rules (baseline and overrides) backing this ability.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
