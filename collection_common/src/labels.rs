//! Card label normalization
//!
//! Cards started out with one fixed type (rookie, regular, autographed,
//! rated) and later moved to free-form label lists. These helpers convert
//! between the two at the data-access boundary; the aggregation code only
//! ever sees the normalized label list.

use crate::models::{CardCategory, LegacyCardType};
use std::collections::HashSet;

/// Trim labels, drop empty ones and remove exact duplicates (first wins)
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_string()))
        .map(str::to_string)
        .collect()
}

impl CardCategory {
    pub fn into_labels(self) -> Vec<String> {
        match self {
            CardCategory::Legacy(t) => vec![t.label().to_string()],
            CardCategory::Labels(labels) => normalize_labels(&labels),
        }
    }
}

/// Pick the label list a card should be stored with
///
/// Free-form labels win when any survive normalization, then the legacy
/// `card_types` array, then the single legacy `card_type`.
pub fn resolve_card_labels(
    card_type: Option<LegacyCardType>,
    card_types: &[LegacyCardType],
    card_labels: &[String],
) -> Vec<String> {
    let labels = normalize_labels(card_labels);
    if !labels.is_empty() {
        return labels;
    }

    if !card_types.is_empty() {
        let legacy: Vec<String> = card_types.iter().map(|t| t.label().to_string()).collect();
        return normalize_labels(&legacy);
    }

    card_type
        .map(|t| CardCategory::Legacy(t).into_labels())
        .unwrap_or_default()
}

impl LegacyCardType {
    /// Derive the legacy primary type column from a label list
    pub fn from_labels(labels: &[String]) -> Self {
        const PRIORITY: [LegacyCardType; 3] = [
            LegacyCardType::Autographed,
            LegacyCardType::Rated,
            LegacyCardType::Rookie,
        ];

        PRIORITY
            .iter()
            .copied()
            .find(|t| labels.iter().any(|l| l.trim().eq_ignore_ascii_case(t.as_str())))
            .unwrap_or(LegacyCardType::Regular)
    }
}
