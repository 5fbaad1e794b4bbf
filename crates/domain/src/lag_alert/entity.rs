use serde::{Deserialize, Serialize};

use super::error::LagRuleError;

/// Store-assigned identifier of a lag alert rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LagRuleId(pub u64);

impl std::fmt::Display for LagRuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LagRuleId {
    type Err = LagRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| LagRuleError::validation("id", format!("'{s}' is not a rule id")))
    }
}

/// Dedup key of a rule: at most one rule may exist per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    pub cluster: String,
    pub group: String,
    pub topic: String,
}

impl RuleKey {
    /// Build a key, trimming surrounding whitespace from every component so
    /// that lookups agree with what creation stored.
    pub fn new(
        cluster: impl Into<String>,
        group: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            cluster: normalize_name(cluster),
            group: normalize_name(group),
            topic: normalize_name(topic),
        }
    }

    /// Flat encoding used by stores that index keys as a single string.
    ///
    /// Components are joined with a NUL byte, which cannot appear in the
    /// trimmed names accepted by validation.
    pub fn encoded(&self) -> String {
        format!("{}\0{}\0{}", self.cluster, self.group, self.topic)
    }
}

impl std::fmt::Display for RuleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.cluster, self.group, self.topic)
    }
}

/// A consumer-lag alert threshold registered for one (cluster, group, topic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagAlertRule {
    pub id: LagRuleId,
    pub cluster: String,
    pub group: String,
    pub topic: String,
    /// Lag at or above which the evaluator fires.
    pub lag_threshold: u64,
    /// Contact for notifications, usually one or more email addresses.
    pub owner: String,
    pub created_at_ns: u64,
    pub modified_at_ns: u64,
}

impl LagAlertRule {
    pub fn key(&self) -> RuleKey {
        RuleKey::new(&self.cluster, &self.group, &self.topic)
    }
}

/// A rule as handed to the store for insertion, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLagRule {
    pub key: RuleKey,
    pub lag_threshold: u64,
    pub owner: String,
    pub created_at_ns: u64,
}

impl NewLagRule {
    /// Materialise the stored form once the store has picked an id.
    pub fn into_rule(self, id: LagRuleId) -> LagAlertRule {
        LagAlertRule {
            id,
            cluster: self.key.cluster,
            group: self.key.group,
            topic: self.key.topic,
            lag_threshold: self.lag_threshold,
            owner: self.owner,
            created_at_ns: self.created_at_ns,
            modified_at_ns: self.created_at_ns,
        }
    }
}

/// Mutable fields written by an update-by-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagRulePatch {
    pub lag_threshold: u64,
    pub owner: String,
    pub modified_at_ns: u64,
}

impl LagRulePatch {
    pub fn apply(&self, rule: &mut LagAlertRule) {
        rule.lag_threshold = self.lag_threshold;
        rule.owner.clone_from(&self.owner);
        rule.modified_at_ns = self.modified_at_ns;
    }
}

/// Raw creation request, as submitted by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagRuleDraft {
    pub cluster: String,
    pub group: String,
    pub topic: String,
    /// Threshold as typed; parsed under a [`ThresholdPolicy`].
    pub lag_threshold: String,
    pub owner: String,
}

impl LagRuleDraft {
    /// Check required fields and return the trimmed dedup key.
    pub fn validated_key(&self) -> Result<RuleKey, LagRuleError> {
        Ok(RuleKey::new(
            required("cluster", &self.cluster)?,
            required("group", &self.group)?,
            required("topic", &self.topic)?,
        ))
    }

    pub fn validated_owner(&self) -> Result<&str, LagRuleError> {
        required("owner", &self.owner)
    }
}

/// Raw modification request for an existing rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagRuleEdit {
    pub lag_threshold: String,
    pub owner: String,
}

impl LagRuleEdit {
    pub fn validated_owner(&self) -> Result<&str, LagRuleError> {
        required("owner", &self.owner)
    }
}

/// How a creation request with an unparsable threshold is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Reject with a validation error.
    #[default]
    Strict,
    /// Log and fall back to zero.
    Lenient,
}

impl ThresholdPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

impl std::fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim a cluster, group or topic name.
pub fn normalize_name(value: impl Into<String>) -> String {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Parse a lag threshold typed by an operator.
///
/// Accepts surrounding whitespace, an optional leading `+` and decimal
/// digits that fit in a `u64`. Minus signs, separators and fractions are
/// rejected.
pub fn parse_lag_threshold(raw: &str) -> Result<u64, LagRuleError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LagRuleError::validation(
            "lag_threshold",
            format!("'{raw}' is not a non-negative integer"),
        ));
    }
    digits.parse::<u64>().map_err(|e| {
        LagRuleError::validation("lag_threshold", format!("'{raw}' out of range: {e}"))
    })
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, LagRuleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LagRuleError::validation(field, "must not be empty"));
    }
    Ok(trimmed)
}
