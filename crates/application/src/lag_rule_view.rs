//! Display shaping for lag rule listings.
//!
//! Rows carry a shortened owner and the row actions an admin grid offers.
//! Stored rules are never modified here.

use serde::Serialize;

use domain::lag_alert::entity::{LagAlertRule, LagRuleId};
use domain::lag_alert::query::LagRulePage;

/// Owner contacts longer than this many characters are shortened.
pub const DEFAULT_OWNER_DISPLAY_WIDTH: usize = 30;

const ELLIPSIS: &str = "...";

/// Action an operator can take on a listed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RowAction {
    Remove { id: LagRuleId },
    Modify { id: LagRuleId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LagRuleRow {
    pub id: LagRuleId,
    pub group: String,
    pub topic: String,
    pub lag_threshold: u64,
    pub owner: String,
    pub created_at_ns: u64,
    pub modified_at_ns: u64,
    pub actions: [RowAction; 2],
}

impl LagRuleRow {
    pub fn from_rule(rule: &LagAlertRule, owner_width: usize) -> Self {
        Self {
            id: rule.id,
            group: rule.group.clone(),
            topic: rule.topic.clone(),
            lag_threshold: rule.lag_threshold,
            owner: truncate_owner(&rule.owner, owner_width),
            created_at_ns: rule.created_at_ns,
            modified_at_ns: rule.modified_at_ns,
            actions: [
                RowAction::Remove { id: rule.id },
                RowAction::Modify { id: rule.id },
            ],
        }
    }
}

/// Listing response for the admin grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LagRuleTable {
    /// Request counter echoed back so the grid can drop stale responses.
    pub echo: u64,
    pub total_records: usize,
    pub display_records: usize,
    pub rows: Vec<LagRuleRow>,
}

impl LagRuleTable {
    pub fn from_page(echo: u64, page: &LagRulePage, owner_width: usize) -> Self {
        Self {
            echo,
            total_records: page.total,
            display_records: page.matching,
            rows: page
                .rules
                .iter()
                .map(|r| LagRuleRow::from_rule(r, owner_width))
                .collect(),
        }
    }
}

/// Keep the first `width` characters of `owner`, marking the cut with `...`.
pub fn truncate_owner(owner: &str, width: usize) -> String {
    match owner.char_indices().nth(width) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &owner[..cut]),
        None => owner.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rule(owner: &str) -> LagAlertRule {
        LagAlertRule {
            id: LagRuleId(7),
            cluster: "prod".to_string(),
            group: "g1".to_string(),
            topic: "t1".to_string(),
            lag_threshold: 1000,
            owner: owner.to_string(),
            created_at_ns: 1,
            modified_at_ns: 2,
        }
    }

    #[test]
    fn short_owner_kept() {
        assert_eq!(truncate_owner("ops@example.com", 30), "ops@example.com");
        let exact = "a".repeat(30);
        assert_eq!(truncate_owner(&exact, 30), exact);
    }

    #[test]
    fn long_owner_cut_at_width() {
        let owner = "alice@example.com,bob@example.com,carol@example.com";
        let shown = truncate_owner(owner, 30);
        assert_eq!(shown, "alice@example.com,bob@example....");
        assert_eq!(shown.chars().count(), 33);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let owner = "é".repeat(40);
        assert_eq!(truncate_owner(&owner, 3), "ééé...");
    }

    #[test]
    fn row_keeps_rule_untouched() {
        let r = rule(&"x".repeat(50));
        let row = LagRuleRow::from_rule(&r, DEFAULT_OWNER_DISPLAY_WIDTH);
        assert_eq!(row.owner.len(), 33);
        assert_eq!(r.owner.len(), 50);
        assert_eq!(
            row.actions,
            [
                RowAction::Remove { id: LagRuleId(7) },
                RowAction::Modify { id: LagRuleId(7) }
            ]
        );
    }

    #[test]
    fn table_uses_independent_counts() {
        let page = LagRulePage {
            rules: vec![rule("ops")],
            total: 12,
            matching: 3,
        };
        let table = LagRuleTable::from_page(4, &page, DEFAULT_OWNER_DISPLAY_WIDTH);
        assert_eq!(table.echo, 4);
        assert_eq!(table.total_records, 12);
        assert_eq!(table.display_records, 3);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn actions_serialize_with_tag() {
        let json = serde_json::to_value(RowAction::Modify { id: LagRuleId(3) }).unwrap();
        assert_eq!(json, serde_json::json!({"action": "modify", "id": 3}));
    }

    proptest! {
        #[test]
        fn truncated_owner_is_a_prefix(owner in "\\PC{0,80}", width in 1usize..60) {
            let shown = truncate_owner(&owner, width);
            let kept = shown.strip_suffix(ELLIPSIS).unwrap_or(&shown);
            prop_assert!(owner.starts_with(kept));
            prop_assert!(kept.chars().count() <= width);
        }
    }
}
