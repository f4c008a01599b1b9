//! Collection statistics
//!
//! Counts cards by status and sums the value of owned cards, either over the
//! whole collection or over the players of one tag (collection view).

use crate::models::{Card, CardStatus, PlayerWithCards, Tag};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Card counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub owned: usize,
    pub located: usize,
    pub missing: usize,
    /// Cards whose status was not recognised; in `total` but in no bucket
    pub unknown: usize,
}

impl StatusCounts {
    fn add(&mut self, card: &Card) {
        self.total += 1;
        match card.status {
            CardStatus::Owned => self.owned += 1,
            CardStatus::Located => self.located += 1,
            CardStatus::Missing => self.missing += 1,
            CardStatus::Unknown => self.unknown += 1,
        }
    }
}

/// Statistics for a set of players
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total_players: usize,
    pub total_cards: usize,
    pub owned: usize,
    pub located: usize,
    pub missing: usize,
    pub unknown_status: usize,
    /// Sum of prices of owned cards; missing prices count as zero
    pub total_value: f64,
}

impl CollectionStats {
    /// Share of cards that are owned, in percent
    pub fn owned_percent(&self) -> f64 {
        if self.total_cards == 0 {
            0.0
        } else {
            self.owned as f64 / self.total_cards as f64 * 100.0
        }
    }

    fn add_player(&mut self, player: &PlayerWithCards) {
        self.total_players += 1;
        let counts = player_stats(player);
        self.total_cards += counts.total;
        self.owned += counts.owned;
        self.located += counts.located;
        self.missing += counts.missing;
        self.unknown_status += counts.unknown;
        self.total_value += owned_value(&player.cards);
    }
}

fn owned_value(cards: &[Card]) -> f64 {
    cards
        .iter()
        .filter(|c| c.status == CardStatus::Owned)
        .filter_map(|c| c.price)
        .filter(|p| p.is_finite())
        .sum()
}

/// Card counts by status for a single player
pub fn player_stats(player: &PlayerWithCards) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for card in &player.cards {
        counts.add(card);
    }
    counts
}

/// Statistics over every player in the snapshot
pub fn collection_stats(players: &[PlayerWithCards]) -> CollectionStats {
    let mut stats = CollectionStats::default();
    for player in players {
        stats.add_player(player);
    }
    stats
}

/// Statistics for the collection view of one tag
///
/// A player with the tag assigned more than once is still counted once.
pub fn tag_stats(players: &[PlayerWithCards], tag_id: &str) -> CollectionStats {
    let mut stats = CollectionStats::default();
    let mut seen = HashSet::new();
    for player in players.iter().filter(|p| p.has_tag(tag_id)) {
        if seen.insert(player.player.id.as_str()) {
            stats.add_player(player);
        }
    }
    stats
}

/// Statistics of one tag's collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagStats {
    pub tag: Tag,
    pub stats: CollectionStats,
}

/// Statistics for every distinct tag present on the players, sorted by name
pub fn stats_by_tag(players: &[PlayerWithCards]) -> Vec<TagStats> {
    let mut tags: BTreeMap<(&str, &str), &Tag> = BTreeMap::new();
    for player in players {
        for tag in player.unique_tags() {
            tags.entry((tag.name.as_str(), tag.id.as_str())).or_insert(tag);
        }
    }

    tags.into_values()
        .map(|tag| TagStats {
            tag: tag.clone(),
            stats: tag_stats(players, &tag.id),
        })
        .collect()
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
