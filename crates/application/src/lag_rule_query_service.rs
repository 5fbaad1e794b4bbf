use std::sync::Arc;

use domain::lag_alert::entity::normalize_name;
use domain::lag_alert::error::LagRuleError;
use domain::lag_alert::query::{LagRulePage, LagRuleQuery};
use ports::secondary::lag_rule_store::LagRuleStore;
use tracing::debug;

/// Default cap on the page size a single listing may request.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Paginated, search-filtered listing of lag rules.
///
/// Returns plain data; shaping rows for display is left to
/// [`crate::lag_rule_view`].
pub struct LagRuleQueryService {
    store: Arc<dyn LagRuleStore>,
    max_page_size: usize,
}

impl LagRuleQueryService {
    pub fn new(store: Arc<dyn LagRuleStore>) -> Self {
        Self {
            store,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// List one page of a cluster's rules.
    ///
    /// `total` and `matching` are counted independently of the page size, so
    /// a zero-sized page still reports accurate counts.
    pub fn list(&self, query: &LagRuleQuery) -> Result<LagRulePage, LagRuleError> {
        if query.cluster.trim().is_empty() {
            return Err(LagRuleError::validation("cluster", "must not be empty"));
        }

        let mut query = query.clone();
        query.cluster = normalize_name(query.cluster);
        query.limit = query.limit.min(self.max_page_size);

        let rules = if query.limit == 0 {
            Vec::new()
        } else {
            self.store.query_rules(&query)?
        };
        let matching = self.store.count_matching(&query)?;
        let total = self.store.count_in_cluster(&query.cluster)?;

        debug!(
            cluster = %query.cluster,
            search = query.search_term().unwrap_or(""),
            offset = query.offset,
            limit = query.limit,
            returned = rules.len(),
            matching,
            total,
            "listed lag rules"
        );

        Ok(LagRulePage {
            rules,
            total,
            matching,
        })
    }
}
