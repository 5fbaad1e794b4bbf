//! Rule storage configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_STORAGE_PATH;

use super::common::{ConfigError, check_not_blank};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Single-file embedded database.
    #[default]
    Redb,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Redb => "redb",
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the redb database file. Created on first use.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StorageBackend::Redb => check_not_blank("storage.path", &self.path),
        }
    }
}
