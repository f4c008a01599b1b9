//! End-to-end checks of the aggregation engine on JSON snapshots, the way the
//! store hands them over.

use collection_common::{
    available_teams, best_value_by_label, collection_stats, filter_players, CardStatus,
    PlayerFilter, PlayerWithCards, Sport,
};

fn snapshot() -> Vec<PlayerWithCards> {
    let json = serde_json::json!([
        {
            "id": "p1",
            "owner_id": "u1",
            "name": "Jayson Tatum",
            "sport": "basketball",
            "teams": ["Lakers", "Celtics"],
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:00:00Z",
            "tags": [{ "id": "t1", "owner_id": "u1", "name": "Rookies", "created_at": "2025-03-01T10:00:00Z" }],
            "cards": [
                { "id": "a", "player_id": "p1", "labels": ["A"], "status": "missing", "price": 5.0,
                  "created_at": "2025-03-01T10:00:00Z", "updated_at": "2025-03-01T10:00:00Z" },
                { "id": "ab", "player_id": "p1", "labels": ["A", "B"], "status": "located", "price": 3.0,
                  "created_at": "2025-03-01T10:00:00Z", "updated_at": "2025-03-01T10:00:00Z" },
                { "id": "b", "player_id": "p1", "labels": ["B"], "status": "missing", "price": 7.0,
                  "created_at": "2025-03-01T10:00:00Z", "updated_at": "2025-03-01T10:00:00Z" }
            ]
        },
        {
            "id": "p2",
            "owner_id": "u1",
            "name": "Connor McDavid",
            "sport": "hockey",
            "teams": ["Oilers"],
            "created_at": "2025-03-02T10:00:00Z",
            "updated_at": "2025-03-02T10:00:00Z",
            "cards": [
                { "id": "c", "player_id": "p2", "labels": ["Young Guns"], "status": "owned", "price": 250.0,
                  "created_at": "2025-03-02T10:00:00Z", "updated_at": "2025-03-02T10:00:00Z" },
                { "id": "d", "player_id": "p2", "labels": ["Young Guns"], "status": "owned", "price": null,
                  "created_at": "2025-03-02T10:00:00Z", "updated_at": "2025-03-02T10:00:00Z" },
                { "id": "e", "player_id": "p2", "labels": ["Base"], "status": "traded", "price": 1.0,
                  "created_at": "2025-03-02T10:00:00Z", "updated_at": "2025-03-02T10:00:00Z" }
            ]
        },
        {
            "id": "p3",
            "owner_id": "u1",
            "name": "Mystery",
            "sport": "quidditch",
            "created_at": "2025-03-03T10:00:00Z",
            "updated_at": "2025-03-03T10:00:00Z"
        }
    ]);
    serde_json::from_value(json).unwrap()
}

#[test]
fn status_counts_and_value_over_snapshot() {
    let players = snapshot();
    let stats = collection_stats(&players);

    let total_cards: usize = players.iter().map(|p| p.cards.len()).sum();
    assert_eq!(stats.total_players, 3);
    assert_eq!(stats.total_cards, total_cards);
    assert_eq!(
        stats.owned + stats.located + stats.missing + stats.unknown_status,
        stats.total_cards
    );
    assert_eq!(stats.unknown_status, 1);
    assert!((stats.total_value - 250.0).abs() < 0.001);
}

#[test]
fn overlapping_labels_flag_single_card() {
    let players = snapshot();
    let flagged = best_value_by_label(&players[0].cards);
    assert_eq!(flagged.len(), 1);
    assert!(flagged.contains("ab"));
}

#[test]
fn best_value_never_flags_unpriced_or_solitary_cards() {
    let players = snapshot();
    // "c" is the only priced Young Guns card, "d" has no price
    assert!(best_value_by_label(&players[1].cards).is_empty());
}

#[test]
fn filter_examples() {
    let players = snapshot();
    let tatum = &players[0];

    let check = |filter: PlayerFilter| filter.matches(tatum);
    assert!(check(PlayerFilter {
        search: "celt".into(),
        ..Default::default()
    }));
    assert!(check(PlayerFilter {
        team: Some("Celtics".into()),
        ..Default::default()
    }));
    assert!(!check(PlayerFilter {
        team: Some("celtics".into()),
        ..Default::default()
    }));
    assert!(check(PlayerFilter {
        tag_id: Some("t1".into()),
        ..Default::default()
    }));
    assert!(!check(PlayerFilter {
        status: Some(CardStatus::Owned),
        ..Default::default()
    }));
}

#[test]
fn unknown_sport_is_listed_but_never_matches_a_sport() {
    let players = snapshot();
    assert_eq!(players[2].player.sport, Sport::Unknown);

    let all = filter_players(&players, &PlayerFilter::default());
    assert_eq!(all.len(), 3);

    let hockey = filter_players(
        &players,
        &PlayerFilter {
            sport: Some(Sport::Hockey),
            ..Default::default()
        },
    );
    assert_eq!(hockey.len(), 1);
    assert_eq!(hockey[0].player.id, "p2");
}

#[test]
fn team_choices_cover_snapshot() {
    assert_eq!(
        available_teams(&snapshot()),
        vec!["Celtics", "Lakers", "Oilers"]
    );
}

#[test]
fn empty_snapshot_yields_nothing() {
    let stats = collection_stats(&[]);
    assert_eq!(stats.total_players, 0);
    assert_eq!(stats.total_cards, 0);
    assert_eq!(stats.total_value, 0.0);
    assert!(best_value_by_label(&[]).is_empty());
}

#[test]
fn null_list_columns_read_as_empty() {
    let json = r#"{
        "id": "p9", "owner_id": "u1", "name": "Null Lists", "sport": "baseball",
        "teams": null, "tags": null,
        "created_at": "2025-03-04T10:00:00Z", "updated_at": "2025-03-04T10:00:00Z",
        "cards": [
            { "id": "n1", "player_id": "p9", "labels": null, "status": "owned", "price": 4.0,
              "created_at": "2025-03-04T10:00:00Z", "updated_at": "2025-03-04T10:00:00Z" }
        ]
    }"#;
    let player: PlayerWithCards = serde_json::from_str(json).unwrap();
    assert!(player.player.teams.is_empty());
    assert!(player.tags.is_empty());
    assert!(player.cards[0].labels.is_empty());

    let players = vec![player];
    let stats = collection_stats(&players);
    assert_eq!(stats.owned, 1);
    assert_eq!(stats.total_value, 4.0);
    assert!(best_value_by_label(&players[0].cards).is_empty());
    assert!(available_teams(&players).is_empty());

    let filter = PlayerFilter {
        search: "null".to_string(),
        ..Default::default()
    };
    assert_eq!(filter_players(&players, &filter).len(), 1);
}

#[test]
fn null_cards_list_reads_as_empty() {
    let json = r#"{
        "id": "p10", "owner_id": "u1", "name": "No Cards", "sport": "golf", "cards": null,
        "created_at": "2025-03-04T10:00:00Z", "updated_at": "2025-03-04T10:00:00Z"
    }"#;
    let player: PlayerWithCards = serde_json::from_str(json).unwrap();
    assert!(player.cards.is_empty());
    assert_eq!(collection_stats(&[player]).total_cards, 0);
}
