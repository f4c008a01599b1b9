//! SQLite store for players, cards, tags, sellers and buy options
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Multi-statement writes run inside a transaction. Every query is scoped to
//! an owner id; a record owned by someone else behaves as if it did not exist.

mod buy_options;
mod cards;
mod players;
mod tags;
mod team_logos;

pub use buy_options::{
    create_buy_option, create_seller, delete_buy_option, delete_seller, list_buy_options,
    list_sellers, update_buy_option, update_seller,
};
pub use cards::{create_card, delete_card, get_card, update_card};
pub use players::{
    create_player, create_players, delete_player, get_player, list_players_with_cards,
    update_player,
};
pub use tags::{assign_tag, create_tag, delete_tag, list_tags, unassign_tag, update_tag};
pub use team_logos::{cache_logo, get_cached_logo, CachedLogo};

use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;

/// Initialize the database schema
///
/// Creates tables if they don't exist and enables foreign keys so that
/// deleting a player removes its cards and tag links, deleting a tag only
/// removes its links, and deleting a seller detaches it from buy options.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            sport TEXT NOT NULL,
            teams TEXT NOT NULL DEFAULT '[]',
            image_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_players_owner ON players(owner_id);

        CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            card_type TEXT NOT NULL,
            labels TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL,
            price REAL,
            source_url TEXT,
            notes TEXT,
            brand TEXT,
            series TEXT,
            is_numbered INTEGER NOT NULL DEFAULT 0,
            serial_num INTEGER,
            serial_total INTEGER,
            image_front TEXT,
            image_back TEXT,
            card_year INTEGER,
            card_team TEXT,
            seller TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cards_player ON cards(player_id);

        -- Tag names are unique per owner
        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (owner_id, name)
        );

        CREATE TABLE IF NOT EXISTS player_tags (
            player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            PRIMARY KEY (player_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS sellers (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS buy_options (
            id TEXT PRIMARY KEY,
            card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            seller_id TEXT REFERENCES sellers(id) ON DELETE SET NULL,
            price REAL,
            shipping_cost REAL NOT NULL DEFAULT 0,
            source_url TEXT,
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_buy_options_card ON buy_options(card_id);

        -- Team logo lookups; a NULL logo_url is a cached miss
        CREATE TABLE IF NOT EXISTS team_logos (
            team_name TEXT NOT NULL,
            sport TEXT NOT NULL,
            logo_url TEXT,
            sportsdb_id TEXT,
            fetched_at TEXT NOT NULL,
            PRIMARY KEY (team_name, sport)
        );
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// Open (or create) the database file and initialise the schema
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            log::info!("Created directory: {}", parent.display());
        }
    }

    let conn = Connection::open(path)?;
    log::info!("Opened database: {}", path.display());
    init_schema(&conn)?;
    Ok(conn)
}

/// Current time as an RFC 3339 UTC timestamp
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Decode a JSON string list column, tolerating malformed data
fn string_list(raw: &str, column: &str) -> Vec<String> {
    match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Ignoring malformed {} value {:?}: {}", column, raw, e);
            Vec::new()
        }
    }
}

fn encode_list(list: &[String]) -> Result<String> {
    Ok(serde_json::to_string(list)?)
}

/// Trim an optional text field, mapping blank input to `None`
fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use collection_common::{NewCard, NewPlayer, PlayerWithCards, Sport};

    pub const OWNER: &str = "owner-1";

    /// Create an in-memory database for testing
    pub fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    pub fn make_test_player(conn: &Connection, name: &str, teams: &[&str]) -> PlayerWithCards {
        create_player(
            conn,
            OWNER,
            &NewPlayer {
                name: name.to_string(),
                sport: Sport::Basketball,
                teams: teams.iter().map(|t| t.to_string()).collect(),
            },
        )
        .unwrap()
    }

    pub fn make_test_new_card(labels: &[&str], price: Option<f64>) -> NewCard {
        NewCard {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            price,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn init_schema_creates_tables() {
        let conn = test_db();

        for table in [
            "players",
            "cards",
            "tags",
            "player_tags",
            "sellers",
            "buy_options",
            "team_logos",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = test_db();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn open_database_creates_parent_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("collection.db");

        let conn = open_database(&path).unwrap();
        assert!(path.exists());
        drop(conn);
    }

    #[test]
    fn string_list_tolerates_garbage() {
        assert_eq!(string_list(r#"["a","b"]"#, "teams"), vec!["a", "b"]);
        assert!(string_list("not json", "teams").is_empty());
    }

    #[test]
    fn clean_text_drops_blank_values() {
        assert_eq!(clean_text(Some("  x ")), Some("x".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }
}
