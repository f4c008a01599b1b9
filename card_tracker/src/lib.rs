//! Card Tracker - sports card collection store and REST API
//!
//! Keeps players, their cards, tags, sellers and buy options in SQLite and
//! serves them over HTTP together with the collection statistics and
//! best-value flags computed by `collection_common`. Also proxies live eBay
//! listings and TheSportsDB team logos.

pub mod config;
pub mod database;
pub mod error;
pub mod image_store;
pub mod marketplace;
pub mod team_logo;
pub mod web;

pub use config::{default_db_path, EbayCredentials, TrackerConfig};
pub use database::{init_schema, open_database};
pub use error::{Error, Result, TrackerError};
pub use image_store::ImageStore;
pub use marketplace::MarketplaceClient;
pub use team_logo::LogoResolver;
