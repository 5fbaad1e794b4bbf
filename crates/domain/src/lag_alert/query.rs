use serde::Serialize;

use super::entity::{LagAlertRule, normalize_name};

/// Listing request for the lag rules of one cluster.
#[derive(Debug, Clone, Default)]
pub struct LagRuleQuery {
    /// Cluster whose rules are listed (exact match on the trimmed name).
    pub cluster: String,
    /// Free-text filter. Empty or blank means no filter.
    pub search: Option<String>,
    /// Maximum number of rules to return.
    pub limit: usize,
    /// Number of matching rules to skip.
    pub offset: usize,
}

impl LagRuleQuery {
    pub fn new(cluster: impl Into<String>, offset: usize, limit: usize) -> Self {
        Self {
            cluster: normalize_name(cluster),
            search: None,
            limit,
            offset,
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The effective search term, trimmed, or `None` when no filter applies.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Check whether a rule belongs to the cluster and matches the search.
    ///
    /// The search is a case-insensitive substring match against the group,
    /// topic and owner.
    pub fn matches(&self, rule: &LagAlertRule) -> bool {
        if rule.cluster != self.cluster {
            return false;
        }
        let Some(term) = self.search_term() else {
            return true;
        };
        let term = term.to_lowercase();
        [&rule.group, &rule.topic, &rule.owner]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Slice bounds of the requested page within `total` matching rows.
    pub fn page_bounds(&self, total: usize) -> (usize, usize) {
        let start = self.offset.min(total);
        let end = start.saturating_add(self.limit).min(total);
        (start, end)
    }
}

/// One page of a listing plus the counts a grid needs for paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LagRulePage {
    pub rules: Vec<LagAlertRule>,
    /// All rules registered for the cluster.
    pub total: usize,
    /// Rules of the cluster that match the search.
    pub matching: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lag_alert::entity::LagRuleId;

    fn make_rule(cluster: &str, group: &str, topic: &str, owner: &str) -> LagAlertRule {
        LagAlertRule {
            id: LagRuleId(1),
            cluster: cluster.to_string(),
            group: group.to_string(),
            topic: topic.to_string(),
            lag_threshold: 100,
            owner: owner.to_string(),
            created_at_ns: 0,
            modified_at_ns: 0,
        }
    }

    #[test]
    fn padded_cluster_matches_stored_rules() {
        let q = LagRuleQuery::new(" prod\t", 0, 10);
        assert_eq!(q.cluster, "prod");
        assert!(q.matches(&make_rule("prod", "g1", "t1", "ops")));
    }

    #[test]
    fn empty_search_matches_cluster_rules() {
        let q = LagRuleQuery::new("prod", 0, 10);
        assert!(q.matches(&make_rule("prod", "g", "t", "o")));
        assert!(!q.matches(&make_rule("staging", "g", "t", "o")));
    }

    #[test]
    fn blank_search_is_no_filter() {
        let q = LagRuleQuery::new("prod", 0, 10).with_search("   ");
        assert_eq!(q.search_term(), None);
        assert!(q.matches(&make_rule("prod", "g", "t", "o")));
    }

    #[test]
    fn search_checks_group_topic_owner() {
        let q = LagRuleQuery::new("prod", 0, 10).with_search("Pay");
        assert!(q.matches(&make_rule("prod", "payments", "t", "o")));
        assert!(q.matches(&make_rule("prod", "g", "PAYOUTS", "o")));
        assert!(q.matches(&make_rule("prod", "g", "t", "paylead@example.com")));
        assert!(!q.matches(&make_rule("prod", "g", "t", "o")));
    }

    #[test]
    fn search_does_not_match_cluster_name() {
        let q = LagRuleQuery::new("prod", 0, 10).with_search("prod");
        assert!(!q.matches(&make_rule("prod", "g", "t", "o")));
    }

    #[test]
    fn page_bounds_clamp() {
        assert_eq!(LagRuleQuery::new("c", 0, 10).page_bounds(25), (0, 10));
        assert_eq!(LagRuleQuery::new("c", 20, 10).page_bounds(25), (20, 25));
        assert_eq!(LagRuleQuery::new("c", 40, 10).page_bounds(25), (25, 25));
        assert_eq!(LagRuleQuery::new("c", 5, 0).page_bounds(25), (5, 5));
        assert_eq!(LagRuleQuery::new("c", 1, usize::MAX).page_bounds(3), (1, 3));
    }
}
