//! Shared helpers and error types used across the config sections.

// ── Config errors ──────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("invalid value '{value}' for field '{field}': expected one of {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("logging already initialized: {0}")]
    Logging(String),
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        Self::Yaml(e.to_string())
    }
}

// ── Validation helpers ─────────────────────────────────────────────

pub(super) fn check_positive(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation {
            field: field.to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

pub(super) fn check_not_blank(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        let err = check_positive("listing.max_page_size", 0).unwrap_err();
        assert!(err.to_string().contains("listing.max_page_size"));
        assert!(check_positive("listing.max_page_size", 1).is_ok());
    }

    #[test]
    fn blank_is_rejected() {
        assert!(check_not_blank("storage.path", "  ").is_err());
        assert!(check_not_blank("storage.path", "data/x.redb").is_ok());
    }

    #[test]
    fn yaml_error_converts() {
        let err: ConfigError = serde_yaml_ng::from_str::<u32>("[1, 2").unwrap_err().into();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
