//! Listing and display configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_OWNER_DISPLAY_WIDTH, DEFAULT_PAGE_SIZE};

use super::common::{ConfigError, check_positive};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingConfig {
    /// Rows per page when a listing does not ask for a size.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound applied to every requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Owner contacts are shortened to this many characters in tables.
    #[serde(default = "default_owner_display_width")]
    pub owner_display_width: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}
fn default_owner_display_width() -> usize {
    DEFAULT_OWNER_DISPLAY_WIDTH
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            owner_display_width: default_owner_display_width(),
        }
    }
}

impl ListingConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        check_positive("listing.max_page_size", self.max_page_size)?;
        check_positive("listing.owner_display_width", self.owner_display_width)?;
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Validation {
                field: "listing.default_page_size".to_string(),
                message: format!(
                    "{} exceeds listing.max_page_size {}",
                    self.default_page_size, self.max_page_size
                ),
            });
        }
        Ok(())
    }
}
