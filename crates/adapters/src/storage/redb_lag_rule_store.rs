use std::path::Path;
use std::sync::Mutex;

use domain::lag_alert::entity::{LagAlertRule, LagRuleId, LagRulePatch, NewLagRule, RuleKey};
use domain::lag_alert::error::LagRuleError;
use domain::lag_alert::query::LagRuleQuery;
use ports::secondary::lag_rule_store::LagRuleStore;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

/// redb table: key = rule id, value = JSON-serialized `LagAlertRule`.
const RULE_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("lag_rules");

/// redb table: key = encoded (cluster, group, topic), value = rule id.
const KEY_INDEX_TABLE: TableDefinition<&str, u64> = TableDefinition::new("lag_rule_keys");

/// redb table holding counters.
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("lag_rule_meta");

const NEXT_ID_KEY: &str = "next_id";

/// Persistent lag rule store backed by redb.
///
/// The key index lives in the same database as the rules and is checked and
/// written in the insert transaction, so two inserts for one key cannot both
/// commit.
pub struct RedbLagRuleStore {
    db: Database,
    /// Serialize writes so the key check and insert see the same state.
    write_lock: Mutex<()>,
}

impl RedbLagRuleStore {
    /// Open (or create) a redb database at `path`.
    pub fn open(path: &Path) -> Result<Self, LagRuleError> {
        let db = Database::create(path).map_err(unavailable("redb open failed"))?;

        // Ensure the tables exist.
        let txn = db.begin_write().map_err(unavailable("redb txn begin"))?;
        {
            txn.open_table(RULE_TABLE)
                .map_err(unavailable("redb table create"))?;
            txn.open_table(KEY_INDEX_TABLE)
                .map_err(unavailable("redb index create"))?;
            txn.open_table(META_TABLE)
                .map_err(unavailable("redb meta create"))?;
        }
        txn.commit().map_err(unavailable("redb commit"))?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, LagRuleError> {
        self.write_lock
            .lock()
            .map_err(|e| LagRuleError::StoreFailed(format!("lock poisoned: {e}")))
    }

    /// Decode every stored rule accepted by `keep`, in ascending id order.
    /// A row that cannot be read or decoded fails the whole scan.
    fn scan(&self, keep: impl Fn(&LagAlertRule) -> bool) -> Result<Vec<LagAlertRule>, LagRuleError> {
        let txn = self.db.begin_read().map_err(query_failed("redb read txn"))?;
        let table = txn
            .open_table(RULE_TABLE)
            .map_err(query_failed("redb read table"))?;

        let mut rules = Vec::new();
        for entry in table.iter().map_err(query_failed("redb iter"))? {
            let (id, value) = entry.map_err(query_failed("redb iter entry"))?;
            let rule: LagAlertRule = serde_json::from_slice(value.value()).map_err(|e| {
                LagRuleError::QueryFailed(format!("deserialize rule {}: {e}", id.value()))
            })?;
            if keep(&rule) {
                rules.push(rule);
            }
        }
        Ok(rules)
    }
}

impl LagRuleStore for RedbLagRuleStore {
    fn insert(&self, rule: NewLagRule) -> Result<LagRuleId, LagRuleError> {
        let _lock = self.lock()?;
        let encoded_key = rule.key.encoded();

        let txn = self.db.begin_write().map_err(store_failed("redb write txn"))?;
        let stored = {
            let mut index = txn
                .open_table(KEY_INDEX_TABLE)
                .map_err(store_failed("redb index table"))?;
            let taken = index
                .get(encoded_key.as_str())
                .map_err(store_failed("redb index get"))?
                .is_some();
            if taken {
                return Err(LagRuleError::DuplicateRule {
                    cluster: rule.key.cluster,
                    group: rule.key.group,
                    topic: rule.key.topic,
                });
            }

            let mut meta = txn
                .open_table(META_TABLE)
                .map_err(store_failed("redb meta table"))?;
            let next = meta
                .get(NEXT_ID_KEY)
                .map_err(store_failed("redb meta get"))?
                .map_or(0, |g| g.value())
                + 1;
            meta.insert(NEXT_ID_KEY, next)
                .map_err(store_failed("redb meta insert"))?;

            let stored = rule.into_rule(LagRuleId(next));
            let value = serde_json::to_vec(&stored)
                .map_err(|e| LagRuleError::StoreFailed(format!("serialize: {e}")))?;

            index
                .insert(encoded_key.as_str(), next)
                .map_err(store_failed("redb index insert"))?;
            let mut rules = txn
                .open_table(RULE_TABLE)
                .map_err(store_failed("redb write table"))?;
            rules
                .insert(next, value.as_slice())
                .map_err(store_failed("redb insert"))?;
            stored
        };
        txn.commit().map_err(store_failed("redb write commit"))?;

        Ok(stored.id)
    }

    fn get(&self, id: LagRuleId) -> Result<Option<LagAlertRule>, LagRuleError> {
        let txn = self.db.begin_read().map_err(query_failed("redb read txn"))?;
        let table = txn
            .open_table(RULE_TABLE)
            .map_err(query_failed("redb read table"))?;

        let result = table.get(id.0).map_err(query_failed("redb get"))?;
        match result {
            Some(guard) => {
                let rule: LagAlertRule = serde_json::from_slice(guard.value())
                    .map_err(|e| LagRuleError::QueryFailed(format!("deserialize: {e}")))?;
                Ok(Some(rule))
            }
            None => Ok(None),
        }
    }

    fn find_by_key(&self, key: &RuleKey) -> Result<Option<LagAlertRule>, LagRuleError> {
        let id = {
            let txn = self.db.begin_read().map_err(query_failed("redb read txn"))?;
            let index = txn
                .open_table(KEY_INDEX_TABLE)
                .map_err(query_failed("redb index table"))?;
            index
                .get(key.encoded().as_str())
                .map_err(query_failed("redb index get"))?
                .map(|g| g.value())
        };
        match id {
            Some(id) => self.get(LagRuleId(id)),
            None => Ok(None),
        }
    }

    fn update(&self, id: LagRuleId, patch: &LagRulePatch) -> Result<bool, LagRuleError> {
        let _lock = self.lock()?;

        let txn = self.db.begin_write().map_err(store_failed("redb write txn"))?;
        {
            let mut table = txn
                .open_table(RULE_TABLE)
                .map_err(store_failed("redb write table"))?;
            let existing = table
                .get(id.0)
                .map_err(store_failed("redb get"))?
                .map(|g| serde_json::from_slice::<LagAlertRule>(g.value()))
                .transpose()
                .map_err(|e| LagRuleError::StoreFailed(format!("deserialize: {e}")))?;

            let Some(mut rule) = existing else {
                return Ok(false);
            };
            patch.apply(&mut rule);
            let value = serde_json::to_vec(&rule)
                .map_err(|e| LagRuleError::StoreFailed(format!("serialize: {e}")))?;
            table
                .insert(id.0, value.as_slice())
                .map_err(store_failed("redb insert"))?;
        }
        txn.commit().map_err(store_failed("redb write commit"))?;

        Ok(true)
    }

    fn delete(&self, id: LagRuleId) -> Result<bool, LagRuleError> {
        let _lock = self.lock()?;

        let txn = self.db.begin_write().map_err(store_failed("redb write txn"))?;
        {
            let mut table = txn
                .open_table(RULE_TABLE)
                .map_err(store_failed("redb write table"))?;
            let removed = table
                .remove(id.0)
                .map_err(store_failed("redb remove"))?
                .map(|g| serde_json::from_slice::<LagAlertRule>(g.value()))
                .transpose()
                .map_err(|e| LagRuleError::StoreFailed(format!("deserialize: {e}")))?;

            let Some(rule) = removed else {
                return Ok(false);
            };
            let mut index = txn
                .open_table(KEY_INDEX_TABLE)
                .map_err(store_failed("redb index table"))?;
            index
                .remove(rule.key().encoded().as_str())
                .map_err(store_failed("redb index remove"))?;
        }
        txn.commit().map_err(store_failed("redb write commit"))?;

        Ok(true)
    }

    fn query_rules(&self, query: &LagRuleQuery) -> Result<Vec<LagAlertRule>, LagRuleError> {
        let mut rules = self.scan(|r| query.matches(r))?;
        let (start, end) = query.page_bounds(rules.len());
        Ok(rules.drain(start..end).collect())
    }

    fn count_matching(&self, query: &LagRuleQuery) -> Result<usize, LagRuleError> {
        Ok(self.scan(|r| query.matches(r))?.len())
    }

    fn count_in_cluster(&self, cluster: &str) -> Result<usize, LagRuleError> {
        Ok(self.scan(|r| r.cluster == cluster)?.len())
    }
}

fn store_failed<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> LagRuleError {
    move |e| LagRuleError::StoreFailed(format!("{context}: {e}"))
}

fn query_failed<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> LagRuleError {
    move |e| LagRuleError::QueryFailed(format!("{context}: {e}"))
}

fn unavailable<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> LagRuleError {
    move |e| LagRuleError::StoreUnavailable(format!("{context}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn make_store() -> (RedbLagRuleStore, NamedTempFile) {
        let tmp = NamedTempFile::new().unwrap();
        let store = RedbLagRuleStore::open(tmp.path()).unwrap();
        (store, tmp)
    }

    fn make_rule(cluster: &str, group: &str, topic: &str, owner: &str) -> NewLagRule {
        NewLagRule {
            key: RuleKey::new(cluster, group, topic),
            lag_threshold: 1000,
            owner: owner.to_string(),
            created_at_ns: 1_000,
        }
    }

    #[test]
    fn insert_and_get() {
        let (store, _tmp) = make_store();
        let id = store
            .insert(make_rule("prod", "g1", "t1", "ops@example.com"))
            .unwrap();

        let rule = store.get(id).unwrap().unwrap();
        assert_eq!(rule.id, id);
        assert_eq!(rule.group, "g1");
        assert_eq!(rule.lag_threshold, 1000);
        assert_eq!(rule.created_at_ns, rule.modified_at_ns);
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let (store, _tmp) = make_store();
        assert!(store.get(LagRuleId(9)).unwrap().is_none());
    }

    #[test]
    fn duplicate_key_rejected() {
        let (store, _tmp) = make_store();
        store.insert(make_rule("prod", "g1", "t1", "a")).unwrap();
        let err = store.insert(make_rule("prod", "g1", "t1", "b")).unwrap_err();
        assert!(matches!(err, LagRuleError::DuplicateRule { .. }));
        assert_eq!(store.count_in_cluster("prod").unwrap(), 1);
    }

    #[test]
    fn find_by_key() {
        let (store, _tmp) = make_store();
        let id = store.insert(make_rule("prod", "g1", "t1", "a")).unwrap();
        let found = store.find_by_key(&RuleKey::new("prod", "g1", "t1")).unwrap();
        assert_eq!(found.map(|r| r.id), Some(id));
        assert!(
            store
                .find_by_key(&RuleKey::new("prod", "g1", "t2"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn update_existing() {
        let (store, _tmp) = make_store();
        let id = store.insert(make_rule("prod", "g1", "t1", "a")).unwrap();
        let patch = LagRulePatch {
            lag_threshold: 2000,
            owner: "b".to_string(),
            modified_at_ns: 5_000,
        };
        assert!(store.update(id, &patch).unwrap());

        let rule = store.get(id).unwrap().unwrap();
        assert_eq!(rule.lag_threshold, 2000);
        assert_eq!(rule.owner, "b");
        assert_eq!(rule.modified_at_ns, 5_000);
        assert_eq!(rule.created_at_ns, 1_000);
    }

    #[test]
    fn update_missing_returns_false() {
        let (store, _tmp) = make_store();
        let patch = LagRulePatch {
            lag_threshold: 1,
            owner: "x".to_string(),
            modified_at_ns: 1,
        };
        assert!(!store.update(LagRuleId(3), &patch).unwrap());
    }

    #[test]
    fn delete_removes_row_and_index() {
        let (store, _tmp) = make_store();
        let id = store.insert(make_rule("prod", "g1", "t1", "a")).unwrap();
        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());

        let again = store.insert(make_rule("prod", "g1", "t1", "a")).unwrap();
        assert_ne!(again, id);
    }

    #[test]
    fn query_offset_limit_and_counts() {
        let (store, _tmp) = make_store();
        for i in 1..=10 {
            store
                .insert(make_rule("prod", "g1", &format!("t{i}"), "a"))
                .unwrap();
        }
        store.insert(make_rule("staging", "g1", "t1", "a")).unwrap();

        let q = LagRuleQuery::new("prod", 2, 3);
        let page = store.query_rules(&q).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].id, LagRuleId(3));
        assert_eq!(store.count_matching(&q).unwrap(), 10);
        assert_eq!(store.count_in_cluster("prod").unwrap(), 10);
        assert_eq!(store.count_in_cluster("staging").unwrap(), 1);
    }

    #[test]
    fn query_with_search() {
        let (store, _tmp) = make_store();
        store
            .insert(make_rule("prod", "billing", "invoices", "fin@example.com"))
            .unwrap();
        store
            .insert(make_rule("prod", "search", "clicks", "web@example.com"))
            .unwrap();

        let q = LagRuleQuery::new("prod", 0, 10).with_search("FIN");
        let page = store.query_rules(&q).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].group, "billing");
        assert_eq!(store.count_matching(&q).unwrap(), 1);
    }

    #[test]
    fn rules_survive_reopen() {
        let tmp = NamedTempFile::new().unwrap();
        let first = {
            let store = RedbLagRuleStore::open(tmp.path()).unwrap();
            store.insert(make_rule("prod", "g1", "t1", "a")).unwrap()
        };

        let store = RedbLagRuleStore::open(tmp.path()).unwrap();
        assert!(store.get(first).unwrap().is_some());
        let second = store.insert(make_rule("prod", "g1", "t2", "a")).unwrap();
        assert!(second > first);
        assert!(matches!(
            store.insert(make_rule("prod", "g1", "t1", "a")),
            Err(LagRuleError::DuplicateRule { .. })
        ));
    }

    #[test]
    fn concurrent_inserts_of_one_key_commit_once() {
        let (store, _tmp) = make_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.insert(make_rule("prod", "g1", "t1", &format!("owner-{i}")))
                })
            })
            .collect();
        let ok = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(ok, 1);
        assert_eq!(store.count_in_cluster("prod").unwrap(), 1);
    }

    #[test]
    fn undecodable_row_fails_listing_and_counts() {
        let (store, _tmp) = make_store();
        store.insert(make_rule("prod", "g1", "t1", "a")).unwrap();
        let corrupt = store.insert(make_rule("prod", "g1", "t2", "a")).unwrap();

        let txn = store.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(RULE_TABLE).unwrap();
            table.insert(corrupt.0, b"not json".as_slice()).unwrap();
        }
        txn.commit().unwrap();

        let q = LagRuleQuery::new("prod", 0, 10);
        assert!(matches!(store.get(corrupt), Err(LagRuleError::QueryFailed(_))));
        assert!(matches!(store.query_rules(&q), Err(LagRuleError::QueryFailed(_))));
        assert!(matches!(store.count_matching(&q), Err(LagRuleError::QueryFailed(_))));
        match store.count_in_cluster("prod") {
            Err(LagRuleError::QueryFailed(msg)) => assert!(msg.contains("rule 2")),
            other => panic!("expected QueryFailed, got {other:?}"),
        }
    }
}
