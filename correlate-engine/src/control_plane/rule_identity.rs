//! Rule identity keying used by the rule->routes index.

use crate::rule::CorrelationRule;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Pointer-identity key over a registered rule.
///
/// Two keys are equal only when they wrap the same `Arc` allocation, so a
/// rule can be removed only with the handle it was registered under.
#[derive(Clone)]
pub(crate) struct RuleIdentityKey {
    rule: Arc<dyn CorrelationRule>,
}

impl RuleIdentityKey {
    pub(crate) fn new(rule: Arc<dyn CorrelationRule>) -> Self {
        Self { rule }
    }

    pub(crate) fn rule(&self) -> &Arc<dyn CorrelationRule> {
        &self.rule
    }
}

impl Hash for RuleIdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.rule) as *const ()).hash(state);
    }
}

impl PartialEq for RuleIdentityKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rule, &other.rule)
    }
}

impl Eq for RuleIdentityKey {}

impl Debug for RuleIdentityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleIdentityKey")
            .field("name", &self.rule.name())
            .finish_non_exhaustive()
    }
}
