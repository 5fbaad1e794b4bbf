//! Consumer-lag alert rules: one lag threshold per (cluster, group, topic).

pub mod entity;
pub mod error;
pub mod query;
