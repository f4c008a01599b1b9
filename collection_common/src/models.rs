use crate::error::{CollectionError, Result};
use crate::money::Money;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Sports a player can be registered under
///
/// Values outside the known set deserialize to `Sport::Unknown` instead of
/// failing, so a malformed row never takes down a whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Football,
    Basketball,
    Baseball,
    Hockey,
    Soccer,
    Golf,
    Tennis,
    Boxing,
    Mma,
    Other,
    #[serde(other)]
    Unknown,
}

impl Sport {
    /// The ten sports a user can pick
    pub const ALL: [Sport; 10] = [
        Sport::Football,
        Sport::Basketball,
        Sport::Baseball,
        Sport::Hockey,
        Sport::Soccer,
        Sport::Golf,
        Sport::Tennis,
        Sport::Boxing,
        Sport::Mma,
        Sport::Other,
    ];

    /// Returns the stored value (e.g., "football", "mma")
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Basketball => "basketball",
            Sport::Baseball => "baseball",
            Sport::Hockey => "hockey",
            Sport::Soccer => "soccer",
            Sport::Golf => "golf",
            Sport::Tennis => "tennis",
            Sport::Boxing => "boxing",
            Sport::Mma => "mma",
            Sport::Other => "other",
            Sport::Unknown => "unknown",
        }
    }

    /// Returns the display name (e.g., "Football", "MMA")
    pub fn label(&self) -> &'static str {
        match self {
            Sport::Football => "Football",
            Sport::Basketball => "Basketball",
            Sport::Baseball => "Baseball",
            Sport::Hockey => "Hockey",
            Sport::Soccer => "Soccer",
            Sport::Golf => "Golf",
            Sport::Tennis => "Tennis",
            Sport::Boxing => "Boxing",
            Sport::Mma => "MMA",
            Sport::Other => "Other",
            Sport::Unknown => "Unknown",
        }
    }

    /// Parse a stored value or display name; only the ten known sports match
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|sport| sport.as_str().eq_ignore_ascii_case(s))
    }

    pub fn is_known(&self) -> bool {
        *self != Sport::Unknown
    }
}

impl FromStr for Sport {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self> {
        Sport::parse(s).ok_or_else(|| CollectionError::unknown("sport", s))
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership state of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Owned,
    /// Seen for sale somewhere but not acquired yet
    Located,
    Missing,
    #[serde(other)]
    Unknown,
}

impl CardStatus {
    pub const ALL: [CardStatus; 3] = [CardStatus::Owned, CardStatus::Located, CardStatus::Missing];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Owned => "owned",
            CardStatus::Located => "located",
            CardStatus::Missing => "missing",
            CardStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }

    pub fn is_known(&self) -> bool {
        *self != CardStatus::Unknown
    }
}

impl FromStr for CardStatus {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self> {
        CardStatus::parse(s).ok_or_else(|| CollectionError::unknown("card status", s))
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed card type from the first schema, kept as the card's primary type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyCardType {
    Rookie,
    Autographed,
    Rated,
    #[default]
    #[serde(other)]
    Regular,
}

impl LegacyCardType {
    pub const ALL: [LegacyCardType; 4] = [
        LegacyCardType::Rookie,
        LegacyCardType::Regular,
        LegacyCardType::Autographed,
        LegacyCardType::Rated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyCardType::Rookie => "rookie",
            LegacyCardType::Regular => "regular",
            LegacyCardType::Autographed => "autographed",
            LegacyCardType::Rated => "rated",
        }
    }

    /// Display label, also used when a legacy type is turned into a free-form label
    pub fn label(&self) -> &'static str {
        match self {
            LegacyCardType::Rookie => "Rookie",
            LegacyCardType::Regular => "Regular",
            LegacyCardType::Autographed => "Autographed",
            LegacyCardType::Rated => "Rated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl FromStr for LegacyCardType {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self> {
        LegacyCardType::parse(s).ok_or_else(|| CollectionError::unknown("card type", s))
    }
}

/// How a card is categorised: the closed legacy enum or an open label set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CardCategory {
    Legacy(LegacyCardType),
    Labels(Vec<String>),
}

/// Serial numbering printed on a card, e.g. 12/99
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SerialNumber {
    pub current: u32,
    pub total: u32,
}

impl SerialNumber {
    /// Build a serial number from the stored columns
    ///
    /// Returns `None` unless the card is flagged as numbered and both halves
    /// are present; a lone current or total is treated as "not numbered".
    pub fn from_parts(is_numbered: bool, current: Option<u32>, total: Option<u32>) -> Option<Self> {
        if !is_numbered {
            return None;
        }
        match (current, total) {
            (Some(current), Some(total)) if total > 0 => Some(SerialNumber { current, total }),
            _ => None,
        }
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// Read a list column that may be stored as `null`; null reads as empty
fn null_as_empty<'de, T, D>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Collection owner's tag (a named group of players)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub sport: Sport,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teams: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub player_id: String,
    /// Primary type from the legacy schema, derived from `labels` on write
    #[serde(default)]
    pub card_type: LegacyCardType,
    /// Free-form labels ("Rookie", "Prizm", "SSP", ...)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<String>,
    pub status: CardStatus,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub is_numbered: bool,
    #[serde(default)]
    pub serial_num: Option<u32>,
    #[serde(default)]
    pub serial_total: Option<u32>,
    #[serde(default)]
    pub image_front: Option<String>,
    #[serde(default)]
    pub image_back: Option<String>,
    #[serde(default)]
    pub card_year: Option<i32>,
    #[serde(default)]
    pub card_team: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Card {
    pub fn serial(&self) -> Option<SerialNumber> {
        SerialNumber::from_parts(self.is_numbered, self.serial_num, self.serial_total)
    }

    /// The card's price as a comparable amount (`None` for absent or zero)
    pub fn money(&self) -> Option<Money> {
        Money::from_price(self.price)
    }
}

/// A player with its cards and assigned tags embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWithCards {
    #[serde(flatten)]
    pub player: Player,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cards: Vec<Card>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Tag>,
}

impl PlayerWithCards {
    /// Team names with duplicates removed (first occurrence wins)
    pub fn unique_teams(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.player
            .teams
            .iter()
            .map(String::as_str)
            .filter(|team| seen.insert(*team))
            .collect()
    }

    /// Assigned tags with duplicate assignments removed (by tag id)
    pub fn unique_tags(&self) -> Vec<&Tag> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .filter(|tag| seen.insert(tag.id.as_str()))
            .collect()
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: String,
}

/// One candidate purchase listing for a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyOption {
    pub id: String,
    pub card_id: String,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub seller: Option<Seller>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub shipping_cost: f64,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
}

// ── Store inputs ───────────────────────────────────────────────────────────

/// Deserialize a present field (even `null`) as `Some(..)`, so that updates
/// can tell "clear this field" apart from "leave it alone".
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn ensure_amount(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(CollectionError::validation(format!(
            "{} must be a non-negative number, got {}",
            field, v
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub sport: Sport,
    #[serde(default)]
    pub teams: Vec<String>,
}

impl NewPlayer {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CollectionError::validation("player name is required"));
        }
        if !self.sport.is_known() {
            return Err(CollectionError::validation("player sport is not recognised"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sport: Option<Sport>,
    #[serde(default)]
    pub teams: Option<Vec<String>>,
}

impl PlayerUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(CollectionError::validation("player name is required"));
            }
        }
        if let Some(sport) = self.sport {
            if !sport.is_known() {
                return Err(CollectionError::validation("player sport is not recognised"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCard {
    /// Legacy single type, still sent by older clients
    #[serde(default)]
    pub card_type: Option<LegacyCardType>,
    #[serde(default)]
    pub card_types: Vec<LegacyCardType>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub status: Option<CardStatus>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub is_numbered: bool,
    #[serde(default)]
    pub serial_num: Option<u32>,
    #[serde(default)]
    pub serial_total: Option<u32>,
    #[serde(default)]
    pub image_front: Option<String>,
    #[serde(default)]
    pub image_back: Option<String>,
    #[serde(default)]
    pub card_year: Option<i32>,
    #[serde(default)]
    pub card_team: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
}

impl NewCard {
    pub fn validate(&self) -> Result<()> {
        if let Some(status) = self.status {
            if !status.is_known() {
                return Err(CollectionError::validation("card status is not recognised"));
            }
        }
        ensure_amount("price", self.price)
    }
}

/// Partial card update; `None` leaves a field untouched
///
/// Nullable fields are double options: `Some(None)` clears the column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardUpdate {
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<CardStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub source_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub brand: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub series: Option<Option<String>>,
    #[serde(default)]
    pub is_numbered: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub serial_num: Option<Option<u32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub serial_total: Option<Option<u32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image_front: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image_back: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub card_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub card_team: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub seller: Option<Option<String>>,
}

impl CardUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(status) = self.status {
            if !status.is_known() {
                return Err(CollectionError::validation("card status is not recognised"));
            }
        }
        ensure_amount("price", self.price.flatten())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSeller {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl NewSeller {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CollectionError::validation("seller name is required"));
        }
        Ok(())
    }
}

/// Partial seller update; `url: Some(None)` clears the link
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub url: Option<Option<String>>,
}

impl SellerUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(CollectionError::validation("seller name is required"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBuyOption {
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Defaults to 0 when absent
    #[serde(default)]
    pub shipping_cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewBuyOption {
    pub fn validate(&self) -> Result<()> {
        ensure_amount("price", self.price)?;
        ensure_amount("shipping cost", self.shipping_cost)
    }
}

/// Partial buy-option update, same conventions as [`CardUpdate`]
///
/// Shipping cost is not nullable; clearing it means sending 0.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuyOptionUpdate {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub seller_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub source_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub price: Option<Option<f64>>,
    #[serde(default)]
    pub shipping_cost: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
}

impl BuyOptionUpdate {
    pub fn validate(&self) -> Result<()> {
        ensure_amount("price", self.price.flatten())?;
        ensure_amount("shipping cost", self.shipping_cost)
    }
}
