use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::garment::{Garment, GarmentId, OwnerId};

/// Structural identity of an outfit: ids of top, secondary top, bottom and shoes.
/// The coat is cosmetic and never part of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComboKey(pub String);

impl ComboKey {
    pub fn from_parts(
        top: &GarmentId,
        secondary_top: Option<&GarmentId>,
        bottom: &GarmentId,
        shoes: &GarmentId,
    ) -> Self {
        let mut parts = vec![top.0.as_str()];
        if let Some(secondary) = secondary_top {
            parts.push(secondary.0.as_str());
        }
        parts.push(bottom.0.as_str());
        parts.push(shoes.0.as_str());
        Self(parts.join("-"))
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Splits a comma-separated list of previously shown keys.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(Self::parse).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComboKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contribution of each scoring rule, before clamping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub base: i32,
    pub formality: i32,
    pub color_harmony: i32,
    pub preferred_color: i32,
    pub occasion: i32,
    pub style: i32,
    pub layering: i32,
    pub variation: i32,
    pub coat: i32,
}

impl ScoreComponents {
    /// Sum of every rule except the coat bonus, which is applied after clamping.
    pub fn raw_total(&self) -> i32 {
        self.base
            + self.formality
            + self.color_harmony
            + self.preferred_color
            + self.occasion
            + self.style
            + self.layering
            + self.variation
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutfitCandidate {
    pub top: Garment,
    pub secondary_top: Option<Garment>,
    pub bottom: Garment,
    pub shoes: Garment,
    pub coat: Option<Garment>,
    pub score: u8,
    pub explanations: Vec<String>,
    pub combo_key: ComboKey,
    pub components: ScoreComponents,
}

impl OutfitCandidate {
    /// First explanation, conventionally shown as the headline reason.
    pub fn headline(&self) -> Option<&str> {
        self.explanations.first().map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutfitId(pub String);

impl fmt::Display for OutfitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Durable record of an outfit the user chose to keep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedOutfit {
    pub id: OutfitId,
    pub owner_id: OwnerId,
    pub top_id: GarmentId,
    pub secondary_top_id: Option<GarmentId>,
    pub bottom_id: GarmentId,
    pub shoes_id: GarmentId,
    pub coat_id: Option<GarmentId>,
    pub score: u8,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_SAVED_SCORE: u8 = 50;

impl SavedOutfit {
    pub fn from_candidate(
        id: OutfitId,
        owner_id: OwnerId,
        candidate: &OutfitCandidate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            top_id: candidate.top.id.clone(),
            secondary_top_id: candidate.secondary_top.as_ref().map(|garment| garment.id.clone()),
            bottom_id: candidate.bottom.id.clone(),
            shoes_id: candidate.shoes.id.clone(),
            coat_id: candidate.coat.as_ref().map(|garment| garment.id.clone()),
            score: candidate.score,
            created_at,
        }
    }

    /// Every garment id the record references, structural pieces first.
    pub fn garment_ids(&self) -> Vec<&GarmentId> {
        let mut ids = vec![&self.top_id];
        ids.extend(self.secondary_top_id.as_ref());
        ids.push(&self.bottom_id);
        ids.push(&self.shoes_id);
        ids.extend(self.coat_id.as_ref());
        ids
    }
}
