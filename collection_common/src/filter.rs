//! Player filter predicate
//!
//! All criteria are AND-combined; an unset criterion matches everything.
//! The predicate keeps no state, so callers re-run it whenever either the
//! filter or the player snapshot changes.

use crate::models::{CardStatus, PlayerWithCards, Sport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Active filter criteria for the player list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerFilter {
    /// Case-insensitive substring of player name, team name or tag name
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sport: Option<Sport>,
    /// Player must have at least one card with this status
    #[serde(default)]
    pub status: Option<CardStatus>,
    #[serde(default)]
    pub tag_id: Option<String>,
    /// Exact, case-sensitive team name
    #[serde(default)]
    pub team: Option<String>,
}

/// Map a UI choice value to a criterion; `""` and `"all"` mean "no filter"
pub fn parse_choice(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_string())
    }
}

impl PlayerFilter {
    /// Whether no criterion is set
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.sport.is_none()
            && self.status.is_none()
            && self.tag_id.is_none()
            && self.team.is_none()
    }

    pub fn matches(&self, player: &PlayerWithCards) -> bool {
        self.matches_search(player)
            && self.matches_tag(player)
            && self.matches_team(player)
            && self.matches_sport(player)
            && self.matches_status(player)
    }

    fn matches_search(&self, player: &PlayerWithCards) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

        hit(&player.player.name)
            || player.unique_teams().into_iter().any(hit)
            || player.unique_tags().into_iter().any(|tag| hit(&tag.name))
    }

    fn matches_tag(&self, player: &PlayerWithCards) -> bool {
        match &self.tag_id {
            Some(tag_id) => player.has_tag(tag_id),
            None => true,
        }
    }

    fn matches_team(&self, player: &PlayerWithCards) -> bool {
        match &self.team {
            Some(team) => player.unique_teams().contains(&team.as_str()),
            None => true,
        }
    }

    fn matches_sport(&self, player: &PlayerWithCards) -> bool {
        match self.sport {
            Some(sport) => sport.is_known() && player.player.sport == sport,
            None => true,
        }
    }

    fn matches_status(&self, player: &PlayerWithCards) -> bool {
        match self.status {
            Some(status) => {
                status.is_known() && player.cards.iter().any(|card| card.status == status)
            }
            None => true,
        }
    }
}

/// Players matching the filter, in input order
pub fn filter_players<'a>(
    players: &'a [PlayerWithCards],
    filter: &PlayerFilter,
) -> Vec<&'a PlayerWithCards> {
    players.iter().filter(|p| filter.matches(p)).collect()
}

/// Sorted, de-duplicated team names for the team filter choices
pub fn available_teams(players: &[PlayerWithCards]) -> Vec<String> {
    players
        .iter()
        .flat_map(|p| p.player.teams.iter())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{make_test_card, make_test_player, make_test_tag};

    fn lakers_player() -> PlayerWithCards {
        make_test_player("p1", "Kareem Abdul-Jabbar", Sport::Basketball, &["Lakers", "Celtics"])
            .with_tags(vec![make_test_tag("t1", "Rookies")])
            .with_cards(vec![make_test_card(
                "c1",
                &["Rookie"],
                CardStatus::Missing,
                None,
            )])
    }

    fn search(text: &str) -> PlayerFilter {
        PlayerFilter {
            search: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = PlayerFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&lakers_player()));
        assert!(filter.matches(&make_test_player("p2", "Nobody", Sport::Unknown, &[])));
    }

    #[test]
    fn search_matches_team_case_insensitively() {
        assert!(search("celt").matches(&lakers_player()));
        assert!(search("LAKERS").matches(&lakers_player()));
    }

    #[test]
    fn search_matches_name_and_tag_name() {
        assert!(search("abdul").matches(&lakers_player()));
        assert!(search("rookies").matches(&lakers_player()));
        assert!(!search("bulls").matches(&lakers_player()));
    }

    #[test]
    fn blank_search_matches() {
        assert!(search("   ").matches(&lakers_player()));
    }

    #[test]
    fn team_filter_is_exact_and_case_sensitive() {
        let filter = |team: &str| PlayerFilter {
            team: Some(team.to_string()),
            ..Default::default()
        };
        assert!(filter("Celtics").matches(&lakers_player()));
        assert!(!filter("celtics").matches(&lakers_player()));
        assert!(!filter("Celt").matches(&lakers_player()));
    }

    #[test]
    fn duplicate_teams_and_tags_match_once() {
        let player = make_test_player("p3", "Twice", Sport::Soccer, &["Arsenal", "Arsenal"])
            .with_tags(vec![make_test_tag("t1", "Gunners"), make_test_tag("t1", "Gunners")]);
        assert_eq!(player.unique_teams(), vec!["Arsenal"]);
        assert_eq!(player.unique_tags().len(), 1);

        let team = PlayerFilter {
            team: Some("Arsenal".to_string()),
            ..Default::default()
        };
        assert!(team.matches(&player));
        assert!(search("gunners").matches(&player));
    }

    #[test]
    fn tag_filter_matches_by_id() {
        let filter = |tag: &str| PlayerFilter {
            tag_id: Some(tag.to_string()),
            ..Default::default()
        };
        assert!(filter("t1").matches(&lakers_player()));
        assert!(!filter("t2").matches(&lakers_player()));
        assert!(!filter("Rookies").matches(&lakers_player()));
    }

    #[test]
    fn status_filter_needs_a_matching_card() {
        let owned = PlayerFilter {
            status: Some(CardStatus::Owned),
            ..Default::default()
        };
        let missing = PlayerFilter {
            status: Some(CardStatus::Missing),
            ..Default::default()
        };
        assert!(!owned.matches(&lakers_player()));
        assert!(missing.matches(&lakers_player()));

        let no_cards = make_test_player("p2", "Empty", Sport::Golf, &[]);
        assert!(!missing.matches(&no_cards));
        assert!(PlayerFilter::default().matches(&no_cards));
    }

    #[test]
    fn unknown_values_never_match_concrete_filters() {
        let player = make_test_player("p2", "Odd", Sport::Unknown, &[]).with_cards(vec![
            make_test_card("c9", &["Base"], CardStatus::Unknown, None),
        ]);

        let by_sport = PlayerFilter {
            sport: Some(Sport::Unknown),
            ..Default::default()
        };
        let by_status = PlayerFilter {
            status: Some(CardStatus::Unknown),
            ..Default::default()
        };
        assert!(!by_sport.matches(&player));
        assert!(!by_status.matches(&player));
    }

    #[test]
    fn criteria_are_and_combined() {
        let filter = PlayerFilter {
            search: "celt".to_string(),
            sport: Some(Sport::Basketball),
            team: Some("Lakers".to_string()),
            tag_id: Some("t1".to_string()),
            status: Some(CardStatus::Missing),
        };
        assert!(filter.matches(&lakers_player()));

        let wrong_sport = PlayerFilter {
            sport: Some(Sport::Football),
            ..filter
        };
        assert!(!wrong_sport.matches(&lakers_player()));
    }

    #[test]
    fn filter_players_keeps_order() {
        let players = vec![
            make_test_player("p1", "Alpha", Sport::Hockey, &[]),
            make_test_player("p2", "Beta", Sport::Soccer, &[]),
            make_test_player("p3", "Gamma", Sport::Hockey, &[]),
        ];
        let filter = PlayerFilter {
            sport: Some(Sport::Hockey),
            ..Default::default()
        };

        let ids: Vec<&str> = filter_players(&players, &filter)
            .iter()
            .map(|p| p.player.id.as_str())
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn parse_choice_treats_all_as_none() {
        assert_eq!(parse_choice("all"), None);
        assert_eq!(parse_choice("ALL"), None);
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("Celtics"), Some("Celtics".to_string()));
    }

    #[test]
    fn available_teams_sorted_and_unique() {
        let players = vec![
            make_test_player("p1", "A", Sport::Basketball, &["Lakers", "Celtics", "Lakers"]),
            make_test_player("p2", "B", Sport::Basketball, &["Bulls", " ", "Celtics"]),
        ];
        assert_eq!(available_teams(&players), vec!["Bulls", "Celtics", "Lakers"]);
    }
}
