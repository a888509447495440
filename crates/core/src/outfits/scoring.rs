//! Compatibility scoring for outfit candidates

use std::collections::BTreeSet;

use crate::domain::garment::{is_wildcard_color, Garment, GarmentClass};
use crate::domain::outfit::{ComboKey, ScoreComponents};
use crate::domain::preferences::{Occasion, Preferences, Style};

use super::{BASE_SCORE, HIGH_HARMONY_THRESHOLD, MAX_SCORE, MIN_SCORE};

/// Color groups considered mutually compatible.
pub const COLOR_PALETTES: &[&[&str]] = &[
    &["black", "white", "gray"],
    &["blue", "white", "black"],
    &["red", "black", "white"],
    &["green", "white", "beige"],
    &["beige", "white", "brown"],
    &["gray", "black", "white"],
    &["blue", "gray", "white"],
    &["black", "gray"],
    &["white", "beige"],
    &["blue", "white"],
];

const NEUTRAL_COLORS: [&str; 4] = ["black", "white", "gray", "beige"];
const SUBDUED_PARTY_COLORS: [&str; 2] = ["black", "gray"];

const FORMALITY_MATCH: &str = "Formality level matches perfectly";
const FORMALITY_COHERENT: &str = "Coherent formality";
const FORMALITY_MIXED: &str = "Mixed formality levels";
const COLORS_PERFECT: &str = "Colors that match perfectly";
const COLORS_GOOD: &str = "Good color harmony";
const PREFERRED_COLORS: &str = "Includes your preferred colors";
const LAYERED_LOOK: &str = "Layered look (pullover + T-shirt)";
const HIGH_HARMONY: &str = "High harmony score";
const FALLBACK: &str = "Classic and versatile combination";

/// The structural pieces of one outfit.
#[derive(Debug, Clone, Copy)]
pub struct OutfitPieces<'a> {
    pub top: &'a Garment,
    pub secondary_top: Option<&'a Garment>,
    pub bottom: &'a Garment,
    pub shoes: &'a Garment,
}

impl<'a> OutfitPieces<'a> {
    /// The visible top layer: the secondary top when layered.
    pub fn outer_top(&self) -> &'a Garment {
        self.secondary_top.unwrap_or(self.top)
    }

    pub fn garments(&self) -> Vec<&'a Garment> {
        let mut garments = vec![self.top, self.bottom, self.shoes];
        garments.extend(self.secondary_top);
        garments
    }

    pub fn combo_key(&self) -> ComboKey {
        ComboKey::from_parts(
            &self.top.id,
            self.secondary_top.map(|garment| &garment.id),
            &self.bottom.id,
            &self.shoes.id,
        )
    }
}

/// Score and justification for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredOutfit {
    pub score: u8,
    pub explanations: Vec<String>,
    pub components: ScoreComponents,
}

/// Heuristic compatibility scorer
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    palettes: &'static [&'static [&'static str]],
}

impl CompatibilityScorer {
    pub fn new() -> Self {
        Self { palettes: COLOR_PALETTES }
    }

    pub fn with_palettes(palettes: &'static [&'static [&'static str]]) -> Self {
        Self { palettes }
    }

    /// Scores one outfit. Explanations are emitted in rule order.
    pub fn score(
        &self,
        pieces: &OutfitPieces<'_>,
        preferences: &Preferences,
        combo_key: &ComboKey,
    ) -> ScoredOutfit {
        let mut explanations: Vec<String> = Vec::new();
        let mut components = ScoreComponents { base: BASE_SCORE, ..ScoreComponents::default() };

        let top_formality = pieces
            .secondary_top
            .map_or(pieces.top.class.formality(), |secondary| {
                pieces.top.class.formality().max(secondary.class.formality())
            });
        let diff = (top_formality - pieces.bottom.class.formality()).abs()
            + (top_formality - pieces.shoes.class.formality()).abs();
        let (formality, reason) = formality_contribution(diff);
        components.formality = formality;
        explanations.extend(reason.map(str::to_string));

        let colors: Vec<String> =
            pieces.garments().iter().map(|garment| garment.normalized_color()).collect();
        let (harmony, reason) = color_harmony(&colors, self.palettes);
        components.color_harmony = harmony;
        if let Some(reason) = reason {
            let repeats_match = reason == COLORS_GOOD
                && explanations.iter().any(|existing| existing.contains("match"));
            if !repeats_match {
                explanations.push(reason.to_string());
            }
        }

        if includes_preferred_color(&colors, &preferences.preferred_colors) {
            components.preferred_color = 14;
            explanations.push(PREFERRED_COLORS.to_string());
        }

        if let Some(occasion) = preferences.occasion {
            let bonus = occasion_bonus(occasion, pieces);
            if bonus > 0 {
                components.occasion = bonus;
                explanations.push(format!("Perfect for {occasion} occasion"));
            }
        }

        if let Some(style) = preferences.style {
            if let Some((bonus, reason)) = style_bonus(style, pieces) {
                components.style = bonus;
                explanations.push(reason.to_string());
            }
        }

        if pieces.secondary_top.is_some() {
            components.layering = 8;
            explanations.push(LAYERED_LOOK.to_string());
        }

        components.variation = (combo_hash(combo_key.as_str()) % 16) as i32;

        let total = components.raw_total();
        if total >= HIGH_HARMONY_THRESHOLD {
            explanations.push(HIGH_HARMONY.to_string());
        }
        if explanations.is_empty() {
            explanations.push(FALLBACK.to_string());
        }

        ScoredOutfit { score: clamp_score(total), explanations, components }
    }
}

impl Default for CompatibilityScorer {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn clamp_score(total: i32) -> u8 {
    total.clamp(MIN_SCORE, MAX_SCORE) as u8
}

/// Points for a formality distance between top, bottom and shoes.
pub fn formality_contribution(diff: i32) -> (i32, Option<&'static str>) {
    match diff {
        0 => (18, Some(FORMALITY_MATCH)),
        1 => (10, Some(FORMALITY_COHERENT)),
        2 => (0, None),
        _ => (-8, Some(FORMALITY_MIXED)),
    }
}

/// Points for how well normalized piece colors sit together.
pub fn color_harmony(
    colors: &[String],
    palettes: &[&[&str]],
) -> (i32, Option<&'static str>) {
    let known: Vec<&str> =
        colors.iter().map(String::as_str).filter(|color| !is_wildcard_color(color)).collect();
    let distinct: BTreeSet<&str> = known.iter().copied().collect();

    let in_palette = palettes.iter().any(|palette| {
        known.iter().all(|color| {
            palette.iter().any(|entry| color.contains(entry) || entry.contains(color))
        })
    });

    if in_palette && distinct.len() >= 2 {
        (28, Some(COLORS_PERFECT))
    } else if in_palette || distinct.len() <= 2 {
        (15, Some(COLORS_GOOD))
    } else if distinct.len() >= 3 {
        (5, None)
    } else {
        (0, None)
    }
}

fn includes_preferred_color(colors: &[String], preferred: &BTreeSet<String>) -> bool {
    preferred.iter().filter(|wanted| !wanted.is_empty()).any(|wanted| {
        colors
            .iter()
            .filter(|color| !is_wildcard_color(color))
            .any(|color| color.contains(wanted.as_str()) || wanted.contains(color.as_str()))
    })
}

fn occasion_bonus(occasion: Occasion, pieces: &OutfitPieces<'_>) -> i32 {
    let outer = pieces.outer_top();
    let matched = match occasion {
        Occasion::Formal => {
            matches!(outer.class, GarmentClass::Shirt | GarmentClass::Coat | GarmentClass::Dress)
        }
        Occasion::Sporty => {
            pieces.top.is_class(GarmentClass::TShirt) || pieces.shoes.is_class(GarmentClass::Sneaker)
        }
        Occasion::Casual => {
            matches!(pieces.top.class, GarmentClass::TShirt | GarmentClass::Pullover)
        }
        Occasion::Party => {
            outer.is_class(GarmentClass::Dress)
                || !SUBDUED_PARTY_COLORS.contains(&outer.normalized_color().as_str())
        }
        Occasion::Work => matches!(outer.class, GarmentClass::Shirt | GarmentClass::Coat),
    };

    match (matched, occasion) {
        (false, _) => 0,
        (true, Occasion::Casual) => 12,
        (true, _) => 16,
    }
}

fn style_bonus(style: Style, pieces: &OutfitPieces<'_>) -> Option<(i32, &'static str)> {
    let outer = pieces.outer_top();
    let top_color = outer.normalized_color();
    let bottom_color = pieces.bottom.normalized_color();
    let neutral = |color: &str| NEUTRAL_COLORS.contains(&color);

    match style {
        Style::Minimalist if neutral(&top_color) && neutral(&bottom_color) => {
            Some((12, "Minimalist and elegant style"))
        }
        Style::Colorful if !neutral(&top_color) || !neutral(&bottom_color) => {
            Some((12, "Colorful and vibrant look"))
        }
        Style::Elegant
            if matches!(outer.class, GarmentClass::Coat | GarmentClass::Dress)
                || pieces.shoes.is_class(GarmentClass::AnkleBoot) =>
        {
            Some((12, "Elegant and sophisticated combination"))
        }
        Style::Modern
            if pieces.top.is_class(GarmentClass::TShirt)
                || pieces.shoes.is_class(GarmentClass::Sneaker) =>
        {
            Some((10, "Modern and current look"))
        }
        _ => None,
    }
}

/// 32-bit rolling hash (`h = h * 31 + c`, wrapping) of a combo key, made non-negative.
pub fn combo_hash(key: &str) -> u32 {
    key.chars()
        .fold(0i32, |hash, ch| hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(ch as i32))
        .unsigned_abs()
}
