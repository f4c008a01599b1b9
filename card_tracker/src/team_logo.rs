//! TheSportsDB client for team logos, backed by the `team_logos` cache
//!
//! A lookup result is cached per (team, sport) forever, misses included, so
//! each team name hits the upstream API at most once.

use collection_common::Sport;
use reqwest::Client;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

use crate::config::SPORTSDB_API_BASE;
use crate::database::{cache_logo, get_cached_logo, CachedLogo};
use crate::error::{Result, TrackerError};

/// League name fragments that identify a sport's teams
fn league_keywords(sport: Sport) -> &'static [&'static str] {
    match sport {
        Sport::Football => &["NFL", "American Football"],
        Sport::Basketball => &["NBA", "Basketball"],
        Sport::Baseball => &["MLB", "Baseball"],
        Sport::Hockey => &["NHL", "Ice Hockey"],
        Sport::Soccer => &[
            "English Premier League",
            "La Liga",
            "Bundesliga",
            "Serie A",
            "MLS",
            "Soccer",
        ],
        Sport::Golf => &["PGA", "Golf"],
        Sport::Tennis => &["ATP", "WTA", "Tennis"],
        Sport::Boxing => &["Boxing"],
        Sport::Mma => &["UFC", "MMA"],
        Sport::Other | Sport::Unknown => &[],
    }
}

/// TheSportsDB team record (only the fields we use)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsDbTeam {
    pub id_team: String,
    #[serde(default)]
    pub str_team: Option<String>,
    #[serde(default)]
    pub str_team_badge: Option<String>,
    #[serde(default)]
    pub str_team_logo: Option<String>,
    #[serde(default)]
    pub str_league: Option<String>,
}

impl SportsDbTeam {
    fn plays_in(&self, keywords: &[&str]) -> bool {
        let Some(league) = &self.str_league else {
            return false;
        };
        let league = league.to_lowercase();
        keywords
            .iter()
            .any(|k| league.contains(&k.to_lowercase()))
    }

    /// Badge if present, otherwise the wordmark logo
    pub fn logo_url(&self) -> Option<&str> {
        [&self.str_team_badge, &self.str_team_logo]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SearchTeamsResponse {
    #[serde(default)]
    teams: Option<Vec<SportsDbTeam>>,
}

/// The team in a league matching `sport`, else the first result
pub fn best_match(teams: &[SportsDbTeam], sport: Sport) -> Option<&SportsDbTeam> {
    let keywords = league_keywords(sport);
    teams
        .iter()
        .find(|team| team.plays_in(keywords))
        .or_else(|| teams.first())
}

/// Resolved logo for a (team, sport) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoLookup {
    pub logo_url: Option<String>,
    pub team_id: Option<String>,
    /// Whether the answer came from the local cache
    pub cached: bool,
}

pub struct LogoResolver {
    client: Client,
    api_key: String,
    pub(crate) base_url: String,
}

impl LogoResolver {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: SPORTSDB_API_BASE.to_string(),
        }
    }

    /// Point the resolver at another host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search TheSportsDB by team name
    pub async fn search_teams(&self, team: &str) -> Result<Vec<SportsDbTeam>> {
        let url = format!(
            "{}/{}/searchteams.php?t={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(team)
        );
        log::debug!("Searching TheSportsDB for team {:?}", team);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TrackerError::HttpStatus(response.status()));
        }

        let body: SearchTeamsResponse = response.json().await?;
        Ok(body.teams.unwrap_or_default())
    }

    /// Look up a logo upstream without touching the cache
    pub async fn fetch_logo(&self, team: &str, sport: Sport) -> Result<CachedLogo> {
        let teams = self.search_teams(team).await?;
        let logo = match best_match(&teams, sport) {
            Some(found) => CachedLogo {
                logo_url: found.logo_url().map(str::to_string),
                team_id: Some(found.id_team.clone()),
            },
            None => CachedLogo {
                logo_url: None,
                team_id: None,
            },
        };
        Ok(logo)
    }
}

/// Cached logo lookup; fetches and caches on a miss
pub async fn resolve_team_logo(
    db: &Mutex<Connection>,
    resolver: &LogoResolver,
    team: &str,
    sport: Sport,
) -> Result<LogoLookup> {
    let team = team.trim();
    if team.is_empty() {
        return Err(TrackerError::validation("team name is required"));
    }

    let cached = {
        let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
        get_cached_logo(&conn, team, sport)?
    };
    if let Some(hit) = cached {
        log::debug!("Logo cache hit for {} ({})", team, sport);
        return Ok(LogoLookup {
            logo_url: hit.logo_url,
            team_id: hit.team_id,
            cached: true,
        });
    }

    let logo = resolver.fetch_logo(team, sport).await?;
    if logo.logo_url.is_none() {
        log::info!("No logo found for {} ({})", team, sport);
    }
    {
        let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
        cache_logo(&conn, team, sport, &logo)?;
    }

    Ok(LogoLookup {
        logo_url: logo.logo_url,
        team_id: logo.team_id,
        cached: false,
    })
}
