//! eBay Browse API proxy for live card listings
//!
//! Searches sports trading card listings sorted by price. A search that
//! names a team or year and finds nothing is retried once with a broader
//! query (player + series only).

mod auth;
mod search;

pub use search::build_query;

use crate::config::{EbayCredentials, EBAY_API_BASE};
use collection_common::{CardUpdate, Money};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use auth::AccessToken;

/// eBay category id for sports trading cards
pub(crate) const SPORTS_CARDS_CATEGORY: &str = "212";

/// Results requested from eBay per search
pub(crate) const SEARCH_LIMIT: u32 = 10;

/// Listings returned to the caller
pub(crate) const MAX_LISTINGS: usize = 5;

/// A marketplace search as sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub player: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Skip the exact query and search player + series right away
    #[serde(default)]
    pub fallback_search: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPrice {
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSeller {
    pub username: String,
    pub feedback_percentage: Option<String>,
}

/// One live listing; clients send it back to apply it to a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub item_id: String,
    pub title: String,
    pub price: ListingPrice,
    pub image_url: Option<String>,
    pub item_web_url: String,
    pub condition: Option<String>,
    pub seller: Option<ListingSeller>,
}

impl Listing {
    /// The asking price as a number; `None` if unparseable or zero
    pub fn price_amount(&self) -> Option<Money> {
        self.price
            .value
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Money::new)
    }

    /// Card update copying this listing's price and link onto a card
    pub fn card_update(&self) -> CardUpdate {
        CardUpdate {
            price: self.price_amount().map(|m| Some(m.amount())),
            source_url: Some(Some(self.item_web_url.clone())),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub items: Vec<Listing>,
    pub total: u64,
    pub fallback_used: bool,
}

/// eBay API client with a cached application token
pub struct MarketplaceClient {
    pub(crate) client: Client,
    pub(crate) credentials: Option<EbayCredentials>,
    pub(crate) base_url: String,
    pub(crate) token: Mutex<Option<AccessToken>>,
}

impl MarketplaceClient {
    pub fn new(credentials: Option<EbayCredentials>) -> Self {
        if credentials.is_none() {
            log::warn!("eBay credentials not configured; marketplace search is disabled");
        }
        Self {
            client: Client::new(),
            credentials,
            base_url: EBAY_API_BASE.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Point the client at another host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
