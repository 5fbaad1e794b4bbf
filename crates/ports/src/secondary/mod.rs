pub mod lag_rule_store;
