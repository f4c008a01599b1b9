//! Player queries

use super::cards::{card_from_row, CARD_COLUMNS};
use super::{encode_list, new_id, now, string_list};
use crate::error::{Result, TrackerError};
use collection_common::{
    normalize_labels, NewPlayer, Player, PlayerUpdate, PlayerWithCards, Sport, Tag,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const PLAYER_COLUMNS: &str = "id, owner_id, name, sport, teams, image_url, created_at, updated_at";

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    let sport: String = row.get(3)?;
    let teams: String = row.get(4)?;
    Ok(Player {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        sport: Sport::parse(&sport).unwrap_or(Sport::Unknown),
        teams: string_list(&teams, "teams"),
        image_url: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// All of an owner's players, newest first, with cards and tags embedded
pub fn list_players_with_cards(conn: &Connection, owner: &str) -> Result<Vec<PlayerWithCards>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players
         WHERE owner_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let players = stmt
        .query_map(params![owner], player_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut cards_by_player: HashMap<String, Vec<_>> = HashMap::new();
    let mut stmt = conn.prepare(&format!(
        "SELECT {CARD_COLUMNS} FROM cards
         WHERE player_id IN (SELECT id FROM players WHERE owner_id = ?1)
         ORDER BY created_at ASC, rowid ASC"
    ))?;
    for card in stmt.query_map(params![owner], card_from_row)? {
        let card = card?;
        cards_by_player
            .entry(card.player_id.clone())
            .or_default()
            .push(card);
    }

    let mut tags_by_player = player_tags(conn, owner, None)?;

    let result: Vec<PlayerWithCards> = players
        .into_iter()
        .map(|player| PlayerWithCards {
            cards: cards_by_player.remove(&player.id).unwrap_or_default(),
            tags: tags_by_player.remove(&player.id).unwrap_or_default(),
            player,
        })
        .collect();

    log::debug!("Loaded {} players for owner {}", result.len(), owner);
    Ok(result)
}

/// Tags per player id, optionally restricted to one player
fn player_tags(
    conn: &Connection,
    owner: &str,
    player_id: Option<&str>,
) -> Result<HashMap<String, Vec<Tag>>> {
    let mut stmt = conn.prepare(
        "SELECT pt.player_id, t.id, t.owner_id, t.name, t.created_at
         FROM player_tags pt
         JOIN tags t ON t.id = pt.tag_id
         WHERE t.owner_id = ?1 AND (?2 IS NULL OR pt.player_id = ?2)
         ORDER BY t.name ASC",
    )?;

    let mut tags: HashMap<String, Vec<Tag>> = HashMap::new();
    let rows = stmt.query_map(params![owner, player_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Tag {
                id: row.get(1)?,
                owner_id: row.get(2)?,
                name: row.get(3)?,
                created_at: row.get(4)?,
            },
        ))
    })?;
    for row in rows {
        let (player_id, tag) = row?;
        tags.entry(player_id).or_default().push(tag);
    }
    Ok(tags)
}

/// A single player with cards and tags, or `None` if it does not exist
pub fn get_player(conn: &Connection, owner: &str, id: &str) -> Result<Option<PlayerWithCards>> {
    let player = conn
        .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1 AND owner_id = ?2"),
            params![id, owner],
            player_from_row,
        )
        .optional()?;

    let Some(player) = player else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE player_id = ?1 ORDER BY created_at ASC, rowid ASC"
    ))?;
    let cards = stmt
        .query_map(params![id], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let tags = player_tags(conn, owner, Some(id))?
        .remove(id)
        .unwrap_or_default();

    Ok(Some(PlayerWithCards {
        player,
        cards,
        tags,
    }))
}

pub(super) fn player_exists(conn: &Connection, owner: &str, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM players WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert a validated player row and return its id
fn insert_player(conn: &Connection, owner: &str, new: &NewPlayer) -> Result<String> {
    let id = new_id();
    let teams = normalize_labels(&new.teams);
    conn.execute(
        "INSERT INTO players (id, owner_id, name, sport, teams, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            &id,
            owner,
            new.name.trim(),
            new.sport.as_str(),
            encode_list(&teams)?,
            now()
        ],
    )?;
    Ok(id)
}

pub fn create_player(conn: &Connection, owner: &str, new: &NewPlayer) -> Result<PlayerWithCards> {
    new.validate()?;

    let id = insert_player(conn, owner, new)?;

    log::info!("Created player {} ({})", new.name.trim(), id);
    get_player(conn, owner, &id)?.ok_or_else(|| TrackerError::not_found("player", &id))
}

/// Create several players at once
///
/// Every row is validated first; if any row is invalid nothing is written.
/// Players are returned in input order.
pub fn create_players(
    conn: &mut Connection,
    owner: &str,
    new: &[NewPlayer],
) -> Result<Vec<PlayerWithCards>> {
    if new.is_empty() {
        return Err(TrackerError::validation("no players to create"));
    }
    for (row, player) in new.iter().enumerate() {
        player
            .validate()
            .map_err(|e| TrackerError::validation(format!("row {}: {}", row + 1, e)))?;
    }

    let tx = conn.transaction()?;
    let ids = new
        .iter()
        .map(|player| insert_player(&tx, owner, player))
        .collect::<Result<Vec<_>>>()?;
    tx.commit()?;

    log::info!("Created {} players", ids.len());
    let conn: &Connection = conn;
    ids.iter()
        .map(|id| get_player(conn, owner, id)?.ok_or_else(|| TrackerError::not_found("player", id)))
        .collect()
}

pub fn update_player(
    conn: &Connection,
    owner: &str,
    id: &str,
    update: &PlayerUpdate,
) -> Result<PlayerWithCards> {
    update.validate()?;

    let existing = get_player(conn, owner, id)?.ok_or_else(|| TrackerError::not_found("player", id))?;
    let mut player = existing.player;

    if let Some(name) = &update.name {
        player.name = name.trim().to_string();
    }
    if let Some(sport) = update.sport {
        player.sport = sport;
    }
    if let Some(teams) = &update.teams {
        player.teams = normalize_labels(teams);
    }

    conn.execute(
        "UPDATE players SET name = ?1, sport = ?2, teams = ?3, updated_at = ?4
         WHERE id = ?5 AND owner_id = ?6",
        params![
            &player.name,
            player.sport.as_str(),
            encode_list(&player.teams)?,
            now(),
            id,
            owner
        ],
    )?;

    get_player(conn, owner, id)?.ok_or_else(|| TrackerError::not_found("player", id))
}

/// Delete a player; its cards, buy options and tag links go with it
pub fn delete_player(conn: &Connection, owner: &str, id: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM players WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    if deleted == 0 {
        return Err(TrackerError::not_found("player", id));
    }
    log::info!("Deleted player {}", id);
    Ok(())
}
