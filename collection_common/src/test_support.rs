//! Record builders shared by the unit tests

use crate::models::{Card, CardStatus, LegacyCardType, Player, PlayerWithCards, Sport, Tag};

const TS: &str = "2025-01-01T00:00:00Z";

pub fn make_test_card(id: &str, labels: &[&str], status: CardStatus, price: Option<f64>) -> Card {
    let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
    Card {
        id: id.to_string(),
        player_id: "p1".to_string(),
        card_type: LegacyCardType::from_labels(&labels),
        labels,
        status,
        price,
        source_url: None,
        notes: None,
        brand: None,
        series: None,
        is_numbered: false,
        serial_num: None,
        serial_total: None,
        image_front: None,
        image_back: None,
        card_year: None,
        card_team: None,
        seller: None,
        created_at: TS.to_string(),
        updated_at: TS.to_string(),
    }
}

pub fn make_test_tag(id: &str, name: &str) -> Tag {
    Tag {
        id: id.to_string(),
        owner_id: "u1".to_string(),
        name: name.to_string(),
        created_at: TS.to_string(),
    }
}

pub fn make_test_player(id: &str, name: &str, sport: Sport, teams: &[&str]) -> PlayerWithCards {
    PlayerWithCards {
        player: Player {
            id: id.to_string(),
            owner_id: "u1".to_string(),
            name: name.to_string(),
            sport,
            teams: teams.iter().map(|t| t.to_string()).collect(),
            image_url: None,
            created_at: TS.to_string(),
            updated_at: TS.to_string(),
        },
        cards: Vec::new(),
        tags: Vec::new(),
    }
}

impl PlayerWithCards {
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        let player_id = self.player.id.clone();
        self.cards = cards
            .into_iter()
            .map(|mut c| {
                c.player_id = player_id.clone();
                c
            })
            .collect();
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }
}
