use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use domain::lag_alert::entity::{LagAlertRule, LagRuleId, LagRulePatch, NewLagRule, RuleKey};
use domain::lag_alert::error::LagRuleError;
use domain::lag_alert::query::LagRuleQuery;

use crate::secondary::lag_rule_store::LagRuleStore;

#[derive(Default)]
struct Tables {
    next_id: u64,
    rules: BTreeMap<LagRuleId, LagAlertRule>,
    keys: HashMap<RuleKey, LagRuleId>,
}

/// In-memory `LagRuleStore` for tests.
///
/// One lock guards both the rows and the key index, so the uniqueness check
/// and the insert happen in the same critical section. Every call to a
/// mutating method is counted, whether or not it changed anything.
#[derive(Default)]
pub struct InMemoryLagRuleStore {
    tables: RwLock<Tables>,
    write_calls: AtomicUsize,
}

impl InMemoryLagRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `insert`, `update` and `delete` calls received so far.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::Relaxed)
    }

    /// Number of stored rules across all clusters.
    ///
    /// # Panics
    ///
    /// Panics if a writer panicked while holding the lock.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .expect("lag rule table lock poisoned")
            .rules
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, LagRuleError> {
        self.tables
            .read()
            .map_err(|e| LagRuleError::QueryFailed(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, LagRuleError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        self.tables
            .write()
            .map_err(|e| LagRuleError::StoreFailed(format!("lock poisoned: {e}")))
    }
}

impl LagRuleStore for InMemoryLagRuleStore {
    fn insert(&self, rule: NewLagRule) -> Result<LagRuleId, LagRuleError> {
        let mut tables = self.write()?;
        if tables.keys.contains_key(&rule.key) {
            return Err(LagRuleError::DuplicateRule {
                cluster: rule.key.cluster,
                group: rule.key.group,
                topic: rule.key.topic,
            });
        }
        tables.next_id += 1;
        let id = LagRuleId(tables.next_id);
        tables.keys.insert(rule.key.clone(), id);
        tables.rules.insert(id, rule.into_rule(id));
        Ok(id)
    }

    fn get(&self, id: LagRuleId) -> Result<Option<LagAlertRule>, LagRuleError> {
        Ok(self.read()?.rules.get(&id).cloned())
    }

    fn find_by_key(&self, key: &RuleKey) -> Result<Option<LagAlertRule>, LagRuleError> {
        let tables = self.read()?;
        Ok(tables
            .keys
            .get(key)
            .and_then(|id| tables.rules.get(id))
            .cloned())
    }

    fn update(&self, id: LagRuleId, patch: &LagRulePatch) -> Result<bool, LagRuleError> {
        let mut tables = self.write()?;
        match tables.rules.get_mut(&id) {
            Some(rule) => {
                patch.apply(rule);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: LagRuleId) -> Result<bool, LagRuleError> {
        let mut tables = self.write()?;
        match tables.rules.remove(&id) {
            Some(rule) => {
                tables.keys.remove(&rule.key());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn query_rules(&self, query: &LagRuleQuery) -> Result<Vec<LagAlertRule>, LagRuleError> {
        let tables = self.read()?;
        let matching: Vec<&LagAlertRule> =
            tables.rules.values().filter(|r| query.matches(r)).collect();
        let (start, end) = query.page_bounds(matching.len());
        Ok(matching[start..end].iter().map(|r| (*r).clone()).collect())
    }

    fn count_matching(&self, query: &LagRuleQuery) -> Result<usize, LagRuleError> {
        Ok(self
            .read()?
            .rules
            .values()
            .filter(|r| query.matches(r))
            .count())
    }

    fn count_in_cluster(&self, cluster: &str) -> Result<usize, LagRuleError> {
        Ok(self
            .read()?
            .rules
            .values()
            .filter(|r| r.cluster == cluster)
            .count())
    }
}
