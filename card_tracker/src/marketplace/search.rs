//! Listing search with the broad-query retry

use serde::Deserialize;

use super::{
    Listing, ListingPrice, ListingSeller, MarketplaceClient, SearchRequest, SearchResult,
    MAX_LISTINGS, SEARCH_LIMIT, SPORTS_CARDS_CATEGORY,
};
use crate::error::{Result, TrackerError};

// ── eBay response shapes ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    item_summaries: Vec<ItemSummary>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary {
    item_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: Option<ItemPrice>,
    #[serde(default)]
    image: Option<ItemImage>,
    #[serde(default)]
    item_web_url: String,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    seller: Option<ItemSeller>,
}

#[derive(Debug, Deserialize)]
struct ItemPrice {
    value: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemImage {
    image_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSeller {
    username: String,
    feedback_percentage: Option<String>,
}

impl From<ItemSummary> for Listing {
    fn from(item: ItemSummary) -> Self {
        let (value, currency) = match item.price {
            Some(price) => (price.value, price.currency),
            None => (None, None),
        };
        Listing {
            item_id: item.item_id,
            title: item.title,
            price: ListingPrice {
                value: value.unwrap_or_else(|| "0".to_string()),
                currency: currency.unwrap_or_else(|| "USD".to_string()),
            },
            image_url: item.image.map(|i| i.image_url),
            item_web_url: item.item_web_url,
            condition: item.condition,
            seller: item.seller.map(|s| ListingSeller {
                username: s.username,
                feedback_percentage: s.feedback_percentage,
            }),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Search terms for a request
///
/// The exact query is `player team series year card`; the fallback query
/// drops team and year. Missing parts are skipped.
pub fn build_query(request: &SearchRequest, fallback: bool) -> String {
    let year = request.year.filter(|_| !fallback).map(|y| y.to_string());
    let mut parts = vec![request.player.trim()];
    if !fallback {
        if let Some(team) = non_blank(&request.team) {
            parts.push(team);
        }
    }
    if let Some(series) = non_blank(&request.series) {
        parts.push(series);
    }
    if let Some(year) = &year {
        parts.push(year);
    }
    parts.push("card");
    parts.join(" ")
}

impl MarketplaceClient {
    async fn search(&self, query: &str) -> Result<(Vec<Listing>, u64)> {
        let token = self.access_token().await?;
        let url = format!("{}/buy/browse/v1/item_summary/search", self.base_url);
        log::info!("Searching eBay for {:?}", query);

        let limit = SEARCH_LIMIT.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("X-EBAY-C-MARKETPLACE-ID", "EBAY_US")
            .query(&[
                ("q", query),
                ("limit", limit.as_str()),
                ("category_ids", SPORTS_CARDS_CATEGORY),
                ("sort", "price"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("eBay search failed ({}): {}", status, body);
            return Err(TrackerError::HttpStatus(status));
        }

        let body: SearchResponse = response.json().await?;
        let listings = body.item_summaries.into_iter().map(Listing::from).collect();
        Ok((listings, body.total))
    }

    /// Search listings, retrying once with the broad query on zero hits
    pub async fn search_listings(&self, request: &SearchRequest) -> Result<SearchResult> {
        if request.player.trim().is_empty() {
            return Err(TrackerError::validation("player name is required"));
        }

        let narrowed = non_blank(&request.team).is_some() || request.year.is_some();
        let mut fallback_used = request.fallback_search;
        let (mut items, mut total) = self.search(&build_query(request, fallback_used)).await?;

        if total == 0 && !fallback_used && narrowed {
            log::info!("No listings found, retrying with a broader query");
            (items, total) = self.search(&build_query(request, true)).await?;
            fallback_used = true;
        }

        items.truncate(MAX_LISTINGS);
        Ok(SearchResult {
            items,
            total,
            fallback_used,
        })
    }
}
