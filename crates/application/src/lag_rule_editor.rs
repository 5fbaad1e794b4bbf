use std::sync::Arc;

use domain::lag_alert::entity::{LagRuleEdit, LagRuleId, LagRulePatch, parse_lag_threshold};
use domain::lag_alert::error::LagRuleError;
use ports::secondary::lag_rule_store::LagRuleStore;
use tracing::info;

use crate::clock::current_timestamp_ns;
use crate::lag_rule_lookup::LagRuleLookup;

/// Update and removal of existing lag rules, addressed by id within a
/// cluster.
pub struct LagRuleEditor {
    store: Arc<dyn LagRuleStore>,
    lookup: LagRuleLookup,
    clock: fn() -> u64,
}

impl LagRuleEditor {
    pub fn new(store: Arc<dyn LagRuleStore>) -> Self {
        Self {
            lookup: LagRuleLookup::new(Arc::clone(&store)),
            store,
            clock: current_timestamp_ns,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the threshold and owner of a rule.
    ///
    /// The threshold is always parsed strictly. Key fields, the creation
    /// time and the id are never touched.
    pub fn update_by_id(
        &self,
        cluster: &str,
        id: LagRuleId,
        edit: &LagRuleEdit,
    ) -> Result<(), LagRuleError> {
        let lag_threshold = parse_lag_threshold(&edit.lag_threshold)?;
        let owner = edit.validated_owner()?.to_string();

        let existing = self.lookup.find_in_cluster(cluster, id)?;
        let patch = LagRulePatch {
            lag_threshold,
            owner,
            modified_at_ns: (self.clock)(),
        };
        if !self.store.update(id, &patch)? {
            return Err(LagRuleError::NotFound(id));
        }

        info!(
            rule_id = %id,
            cluster = %existing.cluster,
            group = %existing.group,
            topic = %existing.topic,
            old_threshold = existing.lag_threshold,
            new_threshold = lag_threshold,
            "lag rule updated"
        );
        Ok(())
    }

    /// Remove a rule. Its key becomes available for a new rule.
    pub fn delete_by_id(&self, cluster: &str, id: LagRuleId) -> Result<(), LagRuleError> {
        let existing = self.lookup.find_in_cluster(cluster, id)?;
        if !self.store.delete(id)? {
            return Err(LagRuleError::NotFound(id));
        }

        info!(
            rule_id = %id,
            cluster = %existing.cluster,
            group = %existing.group,
            topic = %existing.topic,
            "lag rule deleted"
        );
        Ok(())
    }
}
