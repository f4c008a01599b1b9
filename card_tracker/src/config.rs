//! Runtime configuration
//!
//! File locations come from the command line; third-party API credentials
//! come from the environment so they never end up in shell history.

use std::path::PathBuf;

/// eBay Browse API production endpoints
pub const EBAY_API_BASE: &str = "https://api.ebay.com";

/// TheSportsDB public API
pub const SPORTSDB_API_BASE: &str = "https://www.thesportsdb.com/api/v1/json";

/// TheSportsDB's shared test key, used when none is configured
const SPORTSDB_TEST_KEY: &str = "3";

/// OAuth client credentials for the eBay Browse API
#[derive(Debug, Clone)]
pub struct EbayCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl EbayCredentials {
    /// Read `EBAY_CLIENT_ID` / `EBAY_CLIENT_SECRET`; `None` if either is unset
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("EBAY_CLIENT_ID").ok()?;
        let client_secret = std::env::var("EBAY_CLIENT_SECRET").ok()?;
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return None;
        }
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

/// Settings shared by the server and the CLI commands
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub database: PathBuf,
    /// Directory holding uploaded card images
    pub data_dir: PathBuf,
    /// Owner id all records are scoped to
    pub owner: String,
    pub ebay: Option<EbayCredentials>,
    pub sportsdb_api_key: String,
}

impl TrackerConfig {
    pub fn new(database: PathBuf, data_dir: Option<PathBuf>, owner: String) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            database
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let sportsdb_api_key = std::env::var("THESPORTSDB_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| SPORTSDB_TEST_KEY.to_string());

        Self {
            database,
            data_dir,
            owner,
            ebay: EbayCredentials::from_env(),
            sportsdb_api_key,
        }
    }
}

/// Returns the default database path: ~/.local/share/card_tracker/collection.db
pub fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("card_tracker")
        .join("collection.db")
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_defaults_to_database_directory() {
        let config = TrackerConfig::new(
            PathBuf::from("/tmp/tracker/collection.db"),
            None,
            "local".to_string(),
        );
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tracker"));
        assert_eq!(config.owner, "local");
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config = TrackerConfig::new(
            PathBuf::from("/tmp/tracker/collection.db"),
            Some(PathBuf::from("/srv/images")),
            "local".to_string(),
        );
        assert_eq!(config.data_dir, PathBuf::from("/srv/images"));
    }

    #[test]
    fn default_db_path_ends_with_collection_db() {
        assert!(default_db_path().ends_with("collection.db"));
    }
}
