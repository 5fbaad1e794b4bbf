pub mod redb_lag_rule_store;

pub use redb_lag_rule_store::RedbLagRuleStore;
