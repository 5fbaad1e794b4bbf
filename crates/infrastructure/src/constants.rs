// ── Paths ──────────────────────────────────────────────────────────

pub const DEFAULT_CONFIG_PATH: &str = "/etc/lagwatch/config.yaml";

/// redb file used when the config does not name one.
pub const DEFAULT_STORAGE_PATH: &str = "data/lag_rules.redb";

// ── Listing ────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub use application::lag_rule_query_service::DEFAULT_MAX_PAGE_SIZE;
pub use application::lag_rule_view::DEFAULT_OWNER_DISPLAY_WIDTH;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_fits_under_cap() {
        assert!(DEFAULT_PAGE_SIZE > 0);
        assert!(DEFAULT_PAGE_SIZE <= DEFAULT_MAX_PAGE_SIZE);
    }

    #[test]
    fn storage_path_is_redb_file() {
        assert!(DEFAULT_STORAGE_PATH.ends_with(".redb"));
    }
}
