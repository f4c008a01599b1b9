//! Team logo lookup cache

use super::now;
use crate::error::Result;
use collection_common::Sport;
use rusqlite::{params, Connection, OptionalExtension};

/// A cached lookup result; both fields are `None` for a cached miss
#[derive(Debug, Clone, PartialEq)]
pub struct CachedLogo {
    pub logo_url: Option<String>,
    pub team_id: Option<String>,
}

pub fn get_cached_logo(conn: &Connection, team: &str, sport: Sport) -> Result<Option<CachedLogo>> {
    let cached = conn
        .query_row(
            "SELECT logo_url, sportsdb_id FROM team_logos WHERE team_name = ?1 AND sport = ?2",
            params![team, sport.as_str()],
            |row| {
                Ok(CachedLogo {
                    logo_url: row.get(0)?,
                    team_id: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(cached)
}

/// Insert or replace the cached lookup for (team, sport)
pub fn cache_logo(conn: &Connection, team: &str, sport: Sport, logo: &CachedLogo) -> Result<()> {
    conn.execute(
        "INSERT INTO team_logos (team_name, sport, logo_url, sportsdb_id, fetched_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(team_name, sport) DO UPDATE SET
            logo_url = excluded.logo_url,
            sportsdb_id = excluded.sportsdb_id,
            fetched_at = excluded.fetched_at",
        params![team, sport.as_str(), &logo.logo_url, &logo.team_id, now()],
    )?;
    log::debug!("Cached logo for {} ({})", team, sport.as_str());
    Ok(())
}
