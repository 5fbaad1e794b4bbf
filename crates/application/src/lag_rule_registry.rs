use std::sync::Arc;

use domain::lag_alert::entity::{
    LagRuleDraft, LagRuleId, NewLagRule, ThresholdPolicy, parse_lag_threshold,
};
use domain::lag_alert::error::LagRuleError;
use ports::secondary::lag_rule_store::LagRuleStore;
use tracing::{info, warn};

use crate::clock::current_timestamp_ns;
use crate::lag_rule_lookup::LagRuleLookup;

/// The only path through which new lag rules enter the store.
///
/// Validates drafts, rejects a second rule for the same (cluster, group,
/// topic) and stamps creation times. The lookup before insert gives callers
/// a precise error in the common case; the store's own key constraint covers
/// concurrent creates that both pass the lookup.
pub struct LagRuleRegistry {
    store: Arc<dyn LagRuleStore>,
    lookup: LagRuleLookup,
    policy: ThresholdPolicy,
    clock: fn() -> u64,
}

impl LagRuleRegistry {
    pub fn new(store: Arc<dyn LagRuleStore>) -> Self {
        Self {
            lookup: LagRuleLookup::new(Arc::clone(&store)),
            store,
            policy: ThresholdPolicy::default(),
            clock: current_timestamp_ns,
        }
    }

    /// Set how unparsable thresholds in drafts are handled.
    #[must_use]
    pub fn with_threshold_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn threshold_policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Register a new rule and return its id.
    pub fn create(&self, draft: &LagRuleDraft) -> Result<LagRuleId, LagRuleError> {
        let key = draft.validated_key()?;
        let owner = draft.validated_owner()?.to_string();
        let lag_threshold = self.threshold(&draft.lag_threshold)?;

        if self.lookup.find_by_key(&key)?.is_some() {
            warn!(
                cluster = %key.cluster,
                group = %key.group,
                topic = %key.topic,
                "lag rule already registered"
            );
            return Err(LagRuleError::DuplicateRule {
                cluster: key.cluster,
                group: key.group,
                topic: key.topic,
            });
        }

        let rule = NewLagRule {
            key,
            lag_threshold,
            owner,
            created_at_ns: (self.clock)(),
        };
        let log_key = rule.key.clone();
        let id = self.store.insert(rule).inspect_err(|e| {
            if matches!(e, LagRuleError::DuplicateRule { .. }) {
                warn!(key = %log_key, "lag rule registered concurrently");
            }
        })?;

        info!(
            rule_id = %id,
            cluster = %log_key.cluster,
            group = %log_key.group,
            topic = %log_key.topic,
            lag_threshold,
            "lag rule created"
        );
        Ok(id)
    }

    fn threshold(&self, raw: &str) -> Result<u64, LagRuleError> {
        match (parse_lag_threshold(raw), self.policy) {
            (Ok(value), _) => Ok(value),
            (Err(e), ThresholdPolicy::Strict) => Err(e),
            (Err(e), ThresholdPolicy::Lenient) => {
                warn!(error = %e, "unparsable lag threshold, using 0");
                Ok(0)
            }
        }
    }
}
