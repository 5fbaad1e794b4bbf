use domain::lag_alert::entity::{LagAlertRule, LagRuleId, LagRulePatch, NewLagRule, RuleKey};
use domain::lag_alert::error::LagRuleError;
use domain::lag_alert::query::LagRuleQuery;

/// Durable keyed storage for lag alert rules.
///
/// Implementations may use redb or in-memory storage. They must be safe to
/// share across request handlers and must enforce the uniqueness of
/// [`RuleKey`] on their own: the registry's lookup before `insert` is not
/// atomic with it.
pub trait LagRuleStore: Send + Sync {
    /// Persist a new rule and return the id assigned to it.
    ///
    /// Fails with `LagRuleError::DuplicateRule` if a rule with the same key
    /// is already stored.
    fn insert(&self, rule: NewLagRule) -> Result<LagRuleId, LagRuleError>;

    /// Retrieve a single rule by id.
    fn get(&self, id: LagRuleId) -> Result<Option<LagAlertRule>, LagRuleError>;

    /// Retrieve the rule registered for a dedup key, if any.
    fn find_by_key(&self, key: &RuleKey) -> Result<Option<LagAlertRule>, LagRuleError>;

    /// Overwrite the mutable fields of a rule.
    ///
    /// Returns `true` if the rule was found and updated, `false` if not found.
    fn update(&self, id: LagRuleId, patch: &LagRulePatch) -> Result<bool, LagRuleError>;

    /// Remove a rule. Returns `true` if it existed.
    fn delete(&self, id: LagRuleId) -> Result<bool, LagRuleError>;

    /// Rules matching the query, ordered by ascending id, with the query's
    /// offset and limit applied.
    fn query_rules(&self, query: &LagRuleQuery) -> Result<Vec<LagAlertRule>, LagRuleError>;

    /// Number of rules matching the query, ignoring offset and limit.
    fn count_matching(&self, query: &LagRuleQuery) -> Result<usize, LagRuleError>;

    /// Number of rules registered for a cluster.
    fn count_in_cluster(&self, cluster: &str) -> Result<usize, LagRuleError>;
}
