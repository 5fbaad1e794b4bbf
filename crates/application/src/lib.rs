#![forbid(unsafe_code)]

mod clock;
pub mod lag_rule_editor;
pub mod lag_rule_lookup;
pub mod lag_rule_query_service;
pub mod lag_rule_registry;
pub mod lag_rule_view;
