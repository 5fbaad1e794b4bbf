use thiserror::Error;

use super::entity::LagRuleId;

#[derive(Debug, Error)]
pub enum LagRuleError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("group[{group}] and topic[{topic}] already exist in cluster {cluster}")]
    DuplicateRule {
        cluster: String,
        group: String,
        topic: String,
    },

    #[error("lag rule not found: {0}")]
    NotFound(LagRuleId),

    #[error("lag rule store write failed: {0}")]
    StoreFailed(String),

    #[error("lag rule store query failed: {0}")]
    QueryFailed(String),

    #[error("lag rule store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LagRuleError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Persistence failures, which callers report as a generic failure.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::StoreFailed(_) | Self::QueryFailed(_) | Self::StoreUnavailable(_)
        )
    }
}
