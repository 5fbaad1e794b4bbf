use std::sync::Arc;

use domain::lag_alert::entity::{LagAlertRule, LagRuleId, RuleKey};
use domain::lag_alert::error::LagRuleError;
use ports::secondary::lag_rule_store::LagRuleStore;

/// Read-only access to single lag rules, shared by the registry and editor.
#[derive(Clone)]
pub struct LagRuleLookup {
    store: Arc<dyn LagRuleStore>,
}

impl LagRuleLookup {
    pub fn new(store: Arc<dyn LagRuleStore>) -> Self {
        Self { store }
    }

    /// Fetch a rule by id, failing with `NotFound` when it does not exist.
    pub fn find_by_id(&self, id: LagRuleId) -> Result<LagAlertRule, LagRuleError> {
        self.store.get(id)?.ok_or(LagRuleError::NotFound(id))
    }

    /// Fetch the rule registered for a (cluster, group, topic) key.
    pub fn find_by_key(&self, key: &RuleKey) -> Result<Option<LagAlertRule>, LagRuleError> {
        self.store.find_by_key(key)
    }

    /// Fetch a rule by id within a cluster. The cluster name is compared
    /// trimmed; rules of other clusters are reported as `NotFound`.
    pub fn find_in_cluster(
        &self,
        cluster: &str,
        id: LagRuleId,
    ) -> Result<LagAlertRule, LagRuleError> {
        let rule = self.find_by_id(id)?;
        if rule.cluster != cluster.trim() {
            return Err(LagRuleError::NotFound(id));
        }
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::lag_alert::entity::NewLagRule;
    use ports::test_utils::InMemoryLagRuleStore;

    fn seeded() -> (Arc<InMemoryLagRuleStore>, LagRuleLookup, LagRuleId) {
        let store = Arc::new(InMemoryLagRuleStore::new());
        let id = store
            .insert(NewLagRule {
                key: RuleKey::new("prod", "g1", "t1"),
                lag_threshold: 1000,
                owner: "ops@example.com".to_string(),
                created_at_ns: 5,
            })
            .unwrap();
        let lookup = LagRuleLookup::new(Arc::clone(&store) as Arc<dyn LagRuleStore>);
        (store, lookup, id)
    }

    #[test]
    fn find_by_id_returns_rule() {
        let (_store, lookup, id) = seeded();
        let rule = lookup.find_by_id(id).unwrap();
        assert_eq!(rule.group, "g1");
        assert_eq!(rule.lag_threshold, 1000);
    }

    #[test]
    fn find_by_id_missing_is_not_found() {
        let (_store, lookup, _id) = seeded();
        let err = lookup.find_by_id(LagRuleId(404)).unwrap_err();
        assert!(matches!(err, LagRuleError::NotFound(LagRuleId(404))));
    }

    #[test]
    fn find_by_key_hits_and_misses() {
        let (_store, lookup, id) = seeded();
        let hit = lookup.find_by_key(&RuleKey::new("prod", "g1", "t1")).unwrap();
        assert_eq!(hit.map(|r| r.id), Some(id));
        assert!(
            lookup
                .find_by_key(&RuleKey::new("staging", "g1", "t1"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn lookups_do_not_write() {
        let (store, lookup, id) = seeded();
        let before = store.write_calls();
        lookup.find_by_id(id).unwrap();
        lookup.find_by_key(&RuleKey::new("prod", "g1", "t1")).unwrap();
        assert_eq!(store.write_calls(), before);
    }

    #[test]
    fn other_cluster_is_not_found() {
        let (_store, lookup, id) = seeded();
        assert!(lookup.find_in_cluster("prod", id).is_ok());
        assert!(matches!(
            lookup.find_in_cluster("staging", id),
            Err(LagRuleError::NotFound(_))
        ));
    }
}
