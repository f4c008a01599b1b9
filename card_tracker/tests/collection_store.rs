//! End-to-end: records written through the store feed the aggregation engine.

use card_tracker::database::{
    assign_tag, create_card, create_player, create_tag, list_players_with_cards, update_card,
};
use card_tracker::{open_database, TrackerError};
use collection_common::{
    best_value_for_players, collection_stats, filter_players, tag_stats, CardStatus, CardUpdate,
    LegacyCardType, NewCard, NewPlayer, PlayerFilter, Sport,
};
use tempfile::TempDir;

const OWNER: &str = "collector";

fn new_player(name: &str, sport: Sport, teams: &[&str]) -> NewPlayer {
    NewPlayer {
        name: name.to_string(),
        sport,
        teams: teams.iter().map(|t| t.to_string()).collect(),
    }
}

fn new_card(labels: &[&str], status: CardStatus, price: Option<f64>) -> NewCard {
    NewCard {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        status: Some(status),
        price,
        ..Default::default()
    }
}

#[test]
fn stored_collection_aggregates_consistently() {
    let temp_dir = TempDir::new().unwrap();
    let mut conn = open_database(&temp_dir.path().join("collection.db")).unwrap();

    let tatum = create_player(
        &conn,
        OWNER,
        &new_player("Jayson Tatum", Sport::Basketball, &["Celtics"]),
    )
    .unwrap();
    let mcdavid = create_player(
        &conn,
        OWNER,
        &new_player("Connor McDavid", Sport::Hockey, &["Oilers"]),
    )
    .unwrap();
    let id = |p: &collection_common::PlayerWithCards| p.player.id.clone();

    let a = create_card(&mut conn, OWNER, &id(&tatum), &new_card(&["A"], CardStatus::Missing, Some(5.0)))
        .unwrap();
    let ab = create_card(
        &mut conn,
        OWNER,
        &id(&tatum),
        &new_card(&["A", "B"], CardStatus::Located, Some(3.0)),
    )
    .unwrap();
    create_card(&mut conn, OWNER, &id(&tatum), &new_card(&["B"], CardStatus::Missing, Some(7.0)))
        .unwrap();
    create_card(
        &mut conn,
        OWNER,
        &id(&mcdavid),
        &new_card(&["Young Guns", "Rookie"], CardStatus::Owned, Some(250.0)),
    )
    .unwrap();

    let tag = create_tag(&conn, OWNER, "Rookies").unwrap();
    assign_tag(&conn, OWNER, &id(&mcdavid), &tag.id).unwrap();

    let players = list_players_with_cards(&conn, OWNER).unwrap();

    let stats = collection_stats(&players);
    assert_eq!(stats.total_players, 2);
    assert_eq!(stats.total_cards, 4);
    assert_eq!(stats.owned, 1);
    assert_eq!(stats.located, 1);
    assert_eq!(stats.missing, 2);
    assert_eq!(stats.total_value, 250.0);

    let best = best_value_for_players(&players);
    let tatum_best = &best[&id(&tatum)];
    assert!(tatum_best.contains(&ab.id));
    assert!(!tatum_best.contains(&a.id));
    assert!(best[&id(&mcdavid)].is_empty());

    let rookies = tag_stats(&players, &tag.id);
    assert_eq!(rookies.total_players, 1);
    assert_eq!(rookies.total_cards, 1);

    let filter = PlayerFilter {
        search: "rook".to_string(),
        ..Default::default()
    };
    let matched = filter_players(&players, &filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].player.name, "Connor McDavid");
    assert_eq!(matched[0].cards[0].card_type, LegacyCardType::Rookie);

    // Marking the located card as owned moves the value over
    update_card(
        &mut conn,
        OWNER,
        &ab.id,
        &CardUpdate {
            status: Some(CardStatus::Owned),
            ..Default::default()
        },
    )
    .unwrap();
    let players = list_players_with_cards(&conn, OWNER).unwrap();
    let stats = collection_stats(&players);
    assert_eq!(stats.owned, 2);
    assert_eq!(stats.located, 0);
    assert_eq!(stats.total_value, 253.0);
}

#[test]
fn data_survives_reopening_the_database() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("collection.db");

    {
        let conn = open_database(&path).unwrap();
        create_player(&conn, OWNER, &new_player("Tom Brady", Sport::Football, &["Patriots", "Buccaneers"]))
            .unwrap();
    }

    let conn = open_database(&path).unwrap();
    let players = list_players_with_cards(&conn, OWNER).unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].player.teams, vec!["Patriots", "Buccaneers"]);
}

#[test]
fn unknown_sport_cannot_be_stored() {
    let temp_dir = TempDir::new().unwrap();
    let conn = open_database(&temp_dir.path().join("collection.db")).unwrap();

    let result = create_player(&conn, OWNER, &new_player("Nobody", Sport::Unknown, &[]));
    assert!(matches!(result, Err(TrackerError::Validation(_))));
}
