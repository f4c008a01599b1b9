//! Card queries
//!
//! Label normalization happens here, on the way into the store: whatever
//! mix of legacy type, legacy type array and free-form labels a client
//! sends, the stored card carries one normalized label list plus the derived
//! legacy primary type.

use super::players::player_exists;
use super::{clean_text, encode_list, new_id, now, string_list};
use crate::error::{Result, TrackerError};
use collection_common::{
    normalize_labels, resolve_card_labels, Card, CardStatus, CardUpdate, LegacyCardType, NewCard,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

pub(super) const CARD_COLUMNS: &str = "id, player_id, card_type, labels, status, price, source_url, \
     notes, brand, series, is_numbered, serial_num, serial_total, image_front, image_back, \
     card_year, card_team, seller, created_at, updated_at";

pub(super) fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    let card_type: String = row.get(2)?;
    let labels: String = row.get(3)?;
    let status: String = row.get(4)?;
    Ok(Card {
        id: row.get(0)?,
        player_id: row.get(1)?,
        card_type: LegacyCardType::parse(&card_type).unwrap_or_default(),
        labels: string_list(&labels, "labels"),
        status: CardStatus::parse(&status).unwrap_or(CardStatus::Unknown),
        price: row.get(5)?,
        source_url: row.get(6)?,
        notes: row.get(7)?,
        brand: row.get(8)?,
        series: row.get(9)?,
        is_numbered: row.get(10)?,
        serial_num: row.get(11)?,
        serial_total: row.get(12)?,
        image_front: row.get(13)?,
        image_back: row.get(14)?,
        card_year: row.get(15)?,
        card_team: row.get(16)?,
        seller: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}

/// A card, if it belongs to one of the owner's players
pub fn get_card(conn: &Connection, owner: &str, id: &str) -> Result<Option<Card>> {
    let card = conn
        .query_row(
            &format!(
                "SELECT {CARD_COLUMNS} FROM cards
                 WHERE id = ?1
                   AND player_id IN (SELECT id FROM players WHERE owner_id = ?2)"
            ),
            params![id, owner],
            card_from_row,
        )
        .optional()?;
    Ok(card)
}

fn require_labels(labels: Vec<String>) -> Result<Vec<String>> {
    if labels.is_empty() {
        return Err(TrackerError::validation("a card needs at least one label"));
    }
    Ok(labels)
}

/// Serial columns are only kept for numbered cards
fn serial_columns(card: &Card) -> (Option<u32>, Option<u32>) {
    if card.is_numbered {
        (card.serial_num, card.serial_total)
    } else {
        (None, None)
    }
}

fn write_card(tx: &Transaction<'_>, card: &Card, insert: bool) -> Result<()> {
    let (serial_num, serial_total) = serial_columns(card);
    let sql = if insert {
        "INSERT INTO cards (
            card_type, labels, status, price, source_url, notes, brand, series,
            is_numbered, serial_num, serial_total, image_front, image_back,
            card_year, card_team, seller, updated_at, id, player_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
    } else {
        "UPDATE cards SET
            card_type = ?1, labels = ?2, status = ?3, price = ?4, source_url = ?5,
            notes = ?6, brand = ?7, series = ?8, is_numbered = ?9, serial_num = ?10,
            serial_total = ?11, image_front = ?12, image_back = ?13, card_year = ?14,
            card_team = ?15, seller = ?16, updated_at = ?17
         WHERE id = ?18 AND player_id = ?19 AND created_at = ?20"
    };

    let mut stmt = tx.prepare_cached(sql)?;
    stmt.execute(params![
        card.card_type.as_str(),
        encode_list(&card.labels)?,
        card.status.as_str(),
        card.price,
        card.source_url,
        card.notes,
        card.brand,
        card.series,
        card.is_numbered,
        serial_num,
        serial_total,
        card.image_front,
        card.image_back,
        card.card_year,
        card.card_team,
        card.seller,
        card.updated_at,
        card.id,
        card.player_id,
        card.created_at,
    ])?;
    Ok(())
}

pub fn create_card(
    conn: &mut Connection,
    owner: &str,
    player_id: &str,
    new: &NewCard,
) -> Result<Card> {
    new.validate()?;
    let labels = require_labels(resolve_card_labels(
        new.card_type,
        &new.card_types,
        &new.labels,
    ))?;

    let tx = conn.transaction()?;
    if !player_exists(&tx, owner, player_id)? {
        return Err(TrackerError::not_found("player", player_id));
    }

    let ts = now();
    let card = Card {
        id: new_id(),
        player_id: player_id.to_string(),
        card_type: LegacyCardType::from_labels(&labels),
        labels,
        status: new.status.unwrap_or(CardStatus::Missing),
        price: new.price,
        source_url: clean_text(new.source_url.as_deref()),
        notes: clean_text(new.notes.as_deref()),
        brand: clean_text(new.brand.as_deref()),
        series: clean_text(new.series.as_deref()),
        is_numbered: new.is_numbered,
        serial_num: new.serial_num.filter(|_| new.is_numbered),
        serial_total: new.serial_total.filter(|_| new.is_numbered),
        image_front: new.image_front.clone(),
        image_back: new.image_back.clone(),
        card_year: new.card_year,
        card_team: clean_text(new.card_team.as_deref()),
        seller: clean_text(new.seller.as_deref()),
        created_at: ts.clone(),
        updated_at: ts,
    };
    write_card(&tx, &card, true)?;
    tx.commit()?;

    log::info!(
        "Created card {} for player {} ({})",
        card.id,
        player_id,
        card.labels.join(", ")
    );
    Ok(card)
}

/// Apply a partial update and return the stored card
pub fn update_card(
    conn: &mut Connection,
    owner: &str,
    id: &str,
    update: &CardUpdate,
) -> Result<Card> {
    update.validate()?;

    let tx = conn.transaction()?;
    let mut card = get_card(&tx, owner, id)?.ok_or_else(|| TrackerError::not_found("card", id))?;

    if let Some(labels) = &update.labels {
        card.labels = require_labels(normalize_labels(labels))?;
        card.card_type = LegacyCardType::from_labels(&card.labels);
    }
    if let Some(status) = update.status {
        card.status = status;
    }
    if let Some(price) = update.price {
        card.price = price;
    }
    if let Some(value) = &update.source_url {
        card.source_url = clean_text(value.as_deref());
    }
    if let Some(value) = &update.notes {
        card.notes = clean_text(value.as_deref());
    }
    if let Some(value) = &update.brand {
        card.brand = clean_text(value.as_deref());
    }
    if let Some(value) = &update.series {
        card.series = clean_text(value.as_deref());
    }
    if let Some(is_numbered) = update.is_numbered {
        card.is_numbered = is_numbered;
    }
    if let Some(value) = update.serial_num {
        card.serial_num = value;
    }
    if let Some(value) = update.serial_total {
        card.serial_total = value;
    }
    if let Some(value) = &update.image_front {
        card.image_front = value.clone();
    }
    if let Some(value) = &update.image_back {
        card.image_back = value.clone();
    }
    if let Some(value) = update.card_year {
        card.card_year = value;
    }
    if let Some(value) = &update.card_team {
        card.card_team = clean_text(value.as_deref());
    }
    if let Some(value) = &update.seller {
        card.seller = clean_text(value.as_deref());
    }
    card.updated_at = now();

    write_card(&tx, &card, false)?;
    let stored = get_card(&tx, owner, id)?.ok_or_else(|| TrackerError::not_found("card", id))?;
    tx.commit()?;

    log::debug!("Updated card {}", id);
    Ok(stored)
}

/// Delete a card and its buy options
pub fn delete_card(conn: &Connection, owner: &str, id: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM cards
         WHERE id = ?1 AND player_id IN (SELECT id FROM players WHERE owner_id = ?2)",
        params![id, owner],
    )?;
    if deleted == 0 {
        return Err(TrackerError::not_found("card", id));
    }
    log::info!("Deleted card {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn create_card_normalizes_labels_and_derives_primary_type() {
        let mut conn = test_db();
        let player = make_test_player(&conn, "Luka Doncic", &["Mavericks"]);

        let card = create_card(
            &mut conn,
            OWNER,
            &player.player.id,
            &make_test_new_card(&[" Rookie ", "Prizm", "Rookie"], Some(45.0)),
        )
        .unwrap();

        assert_eq!(card.labels, vec!["Rookie", "Prizm"]);
        assert_eq!(card.card_type, LegacyCardType::Rookie);
        assert_eq!(card.status, CardStatus::Missing);

        let stored = get_card(&conn, OWNER, &card.id).unwrap().unwrap();
        assert_eq!(stored, card);
    }

    #[test]
    fn create_card_from_legacy_type_only() {
        let mut conn = test_db();
        let player = make_test_player(&conn, "Old Client", &[]);

        let new = NewCard {
            card_type: Some(LegacyCardType::Autographed),
            status: Some(CardStatus::Owned),
            ..Default::default()
        };
        let card = create_card(&mut conn, OWNER, &player.player.id, &new).unwrap();

        assert_eq!(card.labels, vec!["Autographed"]);
        assert_eq!(card.card_type, LegacyCardType::Autographed);
        assert_eq!(card.status, CardStatus::Owned);
    }

    #[test]
    fn create_card_requires_a_label() {
        let mut conn = test_db();
        let player = make_test_player(&conn, "No Labels", &[]);

        let result = create_card(
            &mut conn,
            OWNER,
            &player.player.id,
            &make_test_new_card(&["  "], None),
        );
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }

    #[test]
    fn create_card_for_unknown_player_fails() {
        let mut conn = test_db();
        let result = create_card(&mut conn, OWNER, "missing", &make_test_new_card(&["Base"], None));
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
    }

    #[test]
    fn serial_columns_dropped_when_not_numbered() {
        let mut conn = test_db();
        let player = make_test_player(&conn, "Numbered", &[]);

        let mut new = make_test_new_card(&["Base"], None);
        new.serial_num = Some(5);
        new.serial_total = Some(25);
        let card = create_card(&mut conn, OWNER, &player.player.id, &new).unwrap();
        assert!(card.serial_num.is_none());
        assert!(card.serial().is_none());

        let update = CardUpdate {
            is_numbered: Some(true),
            serial_num: Some(Some(5)),
            serial_total: Some(Some(25)),
            ..Default::default()
        };
        let card = update_card(&mut conn, OWNER, &card.id, &update).unwrap();
        assert_eq!(card.serial().map(|s| s.to_string()), Some("5/25".to_string()));
    }

    #[test]
    fn update_card_applies_partial_changes() {
        let mut conn = test_db();
        let player = make_test_player(&conn, "Partial", &[]);
        let card = create_card(
            &mut conn,
            OWNER,
            &player.player.id,
            &NewCard {
                notes: Some("keep me".to_string()),
                ..make_test_new_card(&["Base"], Some(10.0))
            },
        )
        .unwrap();

        let update = CardUpdate {
            status: Some(CardStatus::Owned),
            price: Some(None),
            labels: Some(vec!["Autographed".to_string(), "Base".to_string()]),
            ..Default::default()
        };
        let updated = update_card(&mut conn, OWNER, &card.id, &update).unwrap();

        assert_eq!(updated.status, CardStatus::Owned);
        assert_eq!(updated.price, None);
        assert_eq!(updated.notes.as_deref(), Some("keep me"));
        assert_eq!(updated.card_type, LegacyCardType::Autographed);
        assert_eq!(updated.created_at, card.created_at);
    }

    #[test]
    fn update_card_rejects_empty_labels() {
        let mut conn = test_db();
        let player = make_test_player(&conn, "Empty", &[]);
        let card = create_card(&mut conn, OWNER, &player.player.id, &make_test_new_card(&["Base"], None))
            .unwrap();

        let update = CardUpdate {
            labels: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            update_card(&mut conn, OWNER, &card.id, &update),
            Err(TrackerError::Validation(_))
        ));
    }

    #[test]
    fn delete_card_checks_owner() {
        let mut conn = test_db();
        let player = make_test_player(&conn, "Owner", &[]);
        let card = create_card(&mut conn, OWNER, &player.player.id, &make_test_new_card(&["Base"], None))
            .unwrap();

        assert!(matches!(
            delete_card(&conn, "intruder", &card.id),
            Err(TrackerError::NotFound { .. })
        ));
        delete_card(&conn, OWNER, &card.id).unwrap();
        assert!(get_card(&conn, OWNER, &card.id).unwrap().is_none());
    }
}
