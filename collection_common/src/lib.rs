//! Collection Common - shared types for the sports card tracker
//!
//! Holds the domain model (players, cards, tags, sellers, buy options) and the
//! pure aggregation engine: collection statistics, best-value grouping and the
//! player filter predicate. Nothing in this crate performs I/O.

pub mod best_value;
pub mod error;
pub mod filter;
pub mod labels;
pub mod models;
pub mod money;
pub mod stats;

pub use best_value::{
    best_value_by_label, best_value_by_legacy_type, best_value_cards, best_value_for_players,
};
pub use error::{CollectionError, Result};
pub use filter::{available_teams, filter_players, parse_choice, PlayerFilter};
pub use labels::{normalize_labels, resolve_card_labels};
pub use models::{
    BuyOption, BuyOptionUpdate, Card, CardCategory, CardStatus, CardUpdate, LegacyCardType,
    NewBuyOption, NewCard, NewPlayer, NewSeller, Player, PlayerUpdate, PlayerWithCards, Seller,
    SellerUpdate, SerialNumber, Sport, Tag,
};
pub use money::{cheapest_buy_option_total, Money};
pub use stats::{collection_stats, player_stats, stats_by_tag, tag_stats, CollectionStats, StatusCounts, TagStats};

#[cfg(test)]
pub(crate) mod test_support;
