//! Tag queries

use super::players::player_exists;
use super::{new_id, now};
use crate::error::{Result, TrackerError};
use collection_common::Tag;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

/// All of an owner's tags, alphabetically
pub fn list_tags(conn: &Connection, owner: &str) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, owner_id, name, created_at FROM tags WHERE owner_id = ?1 ORDER BY name ASC",
    )?;
    let tags = stmt
        .query_map(params![owner], |row| {
            Ok(Tag {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

fn tag_exists(conn: &Connection, owner: &str, id: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM tags WHERE id = ?1 AND owner_id = ?2",
            params![id, owner],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Create a tag; names are unique per owner
pub fn create_tag(conn: &Connection, owner: &str, name: &str) -> Result<Tag> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::validation("tag name is required"));
    }

    let tag = Tag {
        id: new_id(),
        owner_id: owner.to_string(),
        name: name.to_string(),
        created_at: now(),
    };

    let inserted = conn.execute(
        "INSERT INTO tags (id, owner_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![&tag.id, owner, &tag.name, &tag.created_at],
    );
    match inserted {
        Ok(_) => {}
        Err(e) if is_constraint_violation(&e) => return Err(duplicate_name(&tag.name)),
        Err(e) => return Err(e.into()),
    }

    log::info!("Created tag {} ({})", tag.name, tag.id);
    Ok(tag)
}

fn duplicate_name(name: &str) -> TrackerError {
    TrackerError::validation(format!("tag {:?} already exists", name))
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation)
}

/// Rename a tag; the new name must still be unique for the owner
pub fn update_tag(conn: &Connection, owner: &str, id: &str, name: &str) -> Result<Tag> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::validation("tag name is required"));
    }

    let updated = match conn.execute(
        "UPDATE tags SET name = ?1 WHERE id = ?2 AND owner_id = ?3",
        params![name, id, owner],
    ) {
        Ok(n) => n,
        Err(e) if is_constraint_violation(&e) => return Err(duplicate_name(name)),
        Err(e) => return Err(e.into()),
    };
    if updated == 0 {
        return Err(TrackerError::not_found("tag", id));
    }

    log::info!("Renamed tag {} to {}", id, name);
    get_tag(conn, owner, id)?.ok_or_else(|| TrackerError::not_found("tag", id))
}

fn get_tag(conn: &Connection, owner: &str, id: &str) -> Result<Option<Tag>> {
    let tag = conn
        .query_row(
            "SELECT id, owner_id, name, created_at FROM tags WHERE id = ?1 AND owner_id = ?2",
            params![id, owner],
            |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(tag)
}

/// Delete a tag; players keep everything but the link
pub fn delete_tag(conn: &Connection, owner: &str, id: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM tags WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    if deleted == 0 {
        return Err(TrackerError::not_found("tag", id));
    }
    log::info!("Deleted tag {}", id);
    Ok(())
}

/// Link a tag to a player. Assigning twice is a no-op.
pub fn assign_tag(conn: &Connection, owner: &str, player_id: &str, tag_id: &str) -> Result<()> {
    if !player_exists(conn, owner, player_id)? {
        return Err(TrackerError::not_found("player", player_id));
    }
    if !tag_exists(conn, owner, tag_id)? {
        return Err(TrackerError::not_found("tag", tag_id));
    }

    conn.execute(
        "INSERT OR IGNORE INTO player_tags (player_id, tag_id, created_at) VALUES (?1, ?2, ?3)",
        params![player_id, tag_id, now()],
    )?;
    log::debug!("Assigned tag {} to player {}", tag_id, player_id);
    Ok(())
}

pub fn unassign_tag(conn: &Connection, owner: &str, player_id: &str, tag_id: &str) -> Result<()> {
    if !player_exists(conn, owner, player_id)? {
        return Err(TrackerError::not_found("player", player_id));
    }
    conn.execute(
        "DELETE FROM player_tags
         WHERE player_id = ?1
           AND tag_id IN (SELECT id FROM tags WHERE id = ?2 AND owner_id = ?3)",
        params![player_id, tag_id, owner],
    )?;
    log::debug!("Removed tag {} from player {}", tag_id, player_id);
    Ok(())
}
