//! Best-value grouping
//!
//! Cards are grouped by a key (label or legacy type). Within every group that
//! holds more than one positively priced card, the cheapest card is flagged.
//! A card can be flagged through several groups; the result is a set of ids.

use crate::models::{Card, LegacyCardType, PlayerWithCards};
use crate::money::Money;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Flag the cheapest card of every group with at least two priced members
///
/// `keys` returns the groups a card belongs to. Keys repeated for the same
/// card are collapsed, so a card is never compared against itself. Ties on
/// price go to the card that appears first in `cards`.
pub fn best_value_cards<'a, K, F, I>(cards: &'a [Card], keys: F) -> HashSet<String>
where
    K: Eq + Hash,
    F: Fn(&'a Card) -> I,
    I: IntoIterator<Item = K>,
{
    // group key -> (cheapest card so far, priced member count)
    let mut groups: HashMap<K, (&'a Card, Money, usize)> = HashMap::new();

    for card in cards {
        let Some(price) = card.money() else {
            continue;
        };

        let card_keys: HashSet<K> = keys(card).into_iter().collect();
        for key in card_keys {
            groups
                .entry(key)
                .and_modify(|(best, best_price, count)| {
                    *count += 1;
                    if price < *best_price {
                        *best = card;
                        *best_price = price;
                    }
                })
                .or_insert((card, price, 1));
        }
    }

    let flagged: HashSet<String> = groups
        .into_values()
        .filter(|(_, _, count)| *count > 1)
        .map(|(card, _, _)| card.id.clone())
        .collect();

    log::debug!(
        "Best value: {} of {} cards flagged",
        flagged.len(),
        cards.len()
    );
    flagged
}

/// Best-value cards grouped by free-form label
pub fn best_value_by_label(cards: &[Card]) -> HashSet<String> {
    best_value_cards(cards, |card| card.labels.iter().map(String::as_str))
}

/// Best-value cards grouped by the legacy primary type
pub fn best_value_by_legacy_type(cards: &[Card]) -> HashSet<String> {
    best_value_cards(cards, |card| -> [LegacyCardType; 1] { [card.card_type] })
}

/// Label-based best value, scoped to each player's own cards
pub fn best_value_for_players(players: &[PlayerWithCards]) -> HashMap<String, HashSet<String>> {
    players
        .iter()
        .map(|p| (p.player.id.clone(), best_value_by_label(&p.cards)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardStatus, Sport};
    use crate::test_support::{make_test_card, make_test_player};

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cheaper_of_two_cards_is_flagged() {
        let cards = vec![
            make_test_card("ten", &["Rookie"], CardStatus::Located, Some(10.0)),
            make_test_card("eight", &["Rookie"], CardStatus::Located, Some(8.5)),
        ];
        assert_eq!(best_value_by_label(&cards), ids(&["eight"]));
    }

    #[test]
    fn solitary_priced_card_is_never_flagged() {
        let cards = vec![
            make_test_card("a", &["Rookie"], CardStatus::Owned, Some(10.0)),
            make_test_card("b", &["Rookie"], CardStatus::Owned, None),
            make_test_card("c", &["Rookie"], CardStatus::Owned, Some(0.0)),
        ];
        assert!(best_value_by_label(&cards).is_empty());
    }

    #[test]
    fn overlapping_groups_collapse_to_one_id() {
        let cards = vec![
            make_test_card("five", &["A"], CardStatus::Missing, Some(5.0)),
            make_test_card("three", &["A", "B"], CardStatus::Missing, Some(3.0)),
            make_test_card("seven", &["B"], CardStatus::Missing, Some(7.0)),
        ];

        let only_a: Vec<Card> = cards
            .iter()
            .filter(|c| c.labels.iter().any(|l| l == "A"))
            .cloned()
            .collect();
        assert_eq!(best_value_by_label(&only_a), ids(&["three"]));

        assert_eq!(best_value_by_label(&cards), ids(&["three"]));
    }

    #[test]
    fn distinct_groups_can_flag_distinct_cards() {
        let cards = vec![
            make_test_card("a1", &["A"], CardStatus::Missing, Some(5.0)),
            make_test_card("a2", &["A"], CardStatus::Missing, Some(6.0)),
            make_test_card("b1", &["B"], CardStatus::Missing, Some(9.0)),
            make_test_card("b2", &["B"], CardStatus::Missing, Some(2.0)),
        ];
        assert_eq!(best_value_by_label(&cards), ids(&["a1", "b2"]));
    }

    #[test]
    fn ties_go_to_first_card() {
        let cards = vec![
            make_test_card("first", &["A"], CardStatus::Missing, Some(4.0)),
            make_test_card("second", &["A"], CardStatus::Missing, Some(4.0)),
        ];
        assert_eq!(best_value_by_label(&cards), ids(&["first"]));
    }

    #[test]
    fn unpriced_and_unlabelled_cards_never_flagged() {
        let cards = vec![
            make_test_card("none", &["A"], CardStatus::Missing, None),
            make_test_card("zero", &["A"], CardStatus::Missing, Some(0.0)),
            make_test_card("negative", &["A"], CardStatus::Missing, Some(-1.0)),
            make_test_card("bare", &[], CardStatus::Missing, Some(0.5)),
            make_test_card("x", &["A"], CardStatus::Missing, Some(3.0)),
            make_test_card("y", &["A"], CardStatus::Missing, Some(2.0)),
        ];

        let flagged = best_value_by_label(&cards);
        assert_eq!(flagged, ids(&["y"]));
    }

    #[test]
    fn duplicate_label_on_one_card_is_not_a_comparison() {
        let cards = vec![make_test_card("solo", &["A", "A"], CardStatus::Owned, Some(3.0))];
        assert!(best_value_by_label(&cards).is_empty());
    }

    #[test]
    fn legacy_type_grouping() {
        let cards = vec![
            make_test_card("r1", &["Rookie"], CardStatus::Missing, Some(20.0)),
            make_test_card("r2", &["Rookie", "Prizm"], CardStatus::Missing, Some(15.0)),
            make_test_card("au", &["Autographed"], CardStatus::Missing, Some(1.0)),
        ];
        assert_eq!(best_value_by_legacy_type(&cards), ids(&["r2"]));
    }

    #[test]
    fn empty_input_gives_empty_set() {
        assert!(best_value_by_label(&[]).is_empty());
        assert!(best_value_for_players(&[]).is_empty());
    }

    #[test]
    fn per_player_scope_does_not_mix_players() {
        let players = vec![
            make_test_player("p1", "A", Sport::Soccer, &[]).with_cards(vec![make_test_card(
                "c1",
                &["Rookie"],
                CardStatus::Missing,
                Some(1.0),
            )]),
            make_test_player("p2", "B", Sport::Soccer, &[]).with_cards(vec![make_test_card(
                "c2",
                &["Rookie"],
                CardStatus::Missing,
                Some(2.0),
            )]),
        ];

        let by_player = best_value_for_players(&players);
        assert!(by_player["p1"].is_empty());
        assert!(by_player["p2"].is_empty());
    }
}
