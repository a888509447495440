//! Outfit engine implementation

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::garment::Garment;
use crate::domain::outfit::{ComboKey, OutfitCandidate};
use crate::domain::preferences::Preferences;

use super::partition::{partition, InventoryPartition};
use super::scoring::{clamp_score, CompatibilityScorer, OutfitPieces};
use super::{
    OutfitResult, COAT_BONUS, MAX_ACCEPTED_CANDIDATES, MAX_RECOMMENDATIONS, MAX_SAMPLING_ATTEMPTS,
};

const COAT_EXPLANATION: &str = "Includes coat";

/// Attempts that steer towards one T-shirt based and one pullover based outfit.
const ROTATION_ATTEMPTS: usize = 2;

/// Tracks which top subtypes the early attempts have already drawn from.
#[derive(Debug, Clone, Copy, Default)]
struct TopRotation {
    tshirt_used: bool,
    pullover_used: bool,
}

/// Samples, scores and ranks outfit candidates.
#[derive(Debug, Clone, Default)]
pub struct OutfitEngine {
    scorer: CompatibilityScorer,
}

impl OutfitEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scorer(scorer: CompatibilityScorer) -> Self {
        Self { scorer }
    }

    /// Generates up to `MAX_RECOMMENDATIONS` outfits, best first.
    ///
    /// All randomness is drawn from `rng`, so a seeded source gives reproducible
    /// output. Fails only when the inventory cannot produce any outfit.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        inventory: &[Garment],
        preferences: &Preferences,
        rng: &mut R,
    ) -> OutfitResult<Vec<OutfitCandidate>> {
        let mut candidates = self.sample(inventory, preferences, rng)?;
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(MAX_RECOMMENDATIONS);
        Ok(candidates)
    }

    /// Accepted candidates in generation order, before ranking.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        inventory: &[Garment],
        preferences: &Preferences,
        rng: &mut R,
    ) -> OutfitResult<Vec<OutfitCandidate>> {
        let split = partition(inventory, preferences)?;

        let mut seen: HashSet<ComboKey> = HashSet::new();
        let mut rotation = TopRotation::default();
        let mut accepted = Vec::new();

        for attempt in 0..MAX_SAMPLING_ATTEMPTS {
            if accepted.len() >= MAX_ACCEPTED_CANDIDATES {
                break;
            }

            let Some((top, secondary_top, next_rotation)) =
                pick_tops(&split, preferences.layered_top, attempt, rotation, rng)
            else {
                break;
            };
            rotation = next_rotation;

            let (Some(bottom), Some(shoes)) =
                (split.trousers.choose(rng).copied(), split.sneakers.choose(rng).copied())
            else {
                break;
            };

            let pieces = OutfitPieces { top, secondary_top, bottom, shoes };
            let combo_key = pieces.combo_key();
            if preferences.exclude_keys.contains(&combo_key) || !seen.insert(combo_key.clone()) {
                continue;
            }

            let scored = self.scorer.score(&pieces, preferences, &combo_key);
            let mut candidate = OutfitCandidate {
                top: top.clone(),
                secondary_top: secondary_top.cloned(),
                bottom: bottom.clone(),
                shoes: shoes.clone(),
                coat: None,
                score: scored.score,
                explanations: scored.explanations,
                combo_key,
                components: scored.components,
            };

            if preferences.include_coat {
                if let Some(coat) = split.coats.choose(rng).copied() {
                    attach_coat(&mut candidate, coat);
                }
            }

            accepted.push(candidate);
        }

        Ok(accepted)
    }

    /// Same as [`generate`](Self::generate) using the thread-local RNG.
    pub fn generate_with_thread_rng(
        &self,
        inventory: &[Garment],
        preferences: &Preferences,
    ) -> OutfitResult<Vec<OutfitCandidate>> {
        self.generate(inventory, preferences, &mut rand::thread_rng())
    }
}

/// Generates ranked outfits with the default scorer.
pub fn generate_outfits<R: Rng + ?Sized>(
    inventory: &[Garment],
    preferences: &Preferences,
    rng: &mut R,
) -> OutfitResult<Vec<OutfitCandidate>> {
    OutfitEngine::new().generate(inventory, preferences, rng)
}

type TopPick<'a> = (&'a Garment, Option<&'a Garment>, TopRotation);

fn pick_tops<'a, R: Rng + ?Sized>(
    split: &InventoryPartition<'a>,
    layered: bool,
    attempt: usize,
    rotation: TopRotation,
    rng: &mut R,
) -> Option<TopPick<'a>> {
    if layered {
        let tshirt = split.tshirts.choose(rng).copied()?;
        let pullover = split.pullovers.choose(rng).copied()?;
        return Some((tshirt, Some(pullover), rotation));
    }

    if !split.has_both_top_kinds() {
        let pool = if split.tshirts.is_empty() { &split.pullovers } else { &split.tshirts };
        return pool.choose(rng).copied().map(|top| (top, None, rotation));
    }

    let early = attempt < ROTATION_ATTEMPTS;
    let (use_tshirt, next) = if early && !rotation.tshirt_used {
        (true, TopRotation { tshirt_used: true, ..rotation })
    } else if early && !rotation.pullover_used {
        (false, TopRotation { pullover_used: true, ..rotation })
    } else {
        (rng.gen_bool(0.5), rotation)
    };

    let pool = if use_tshirt { &split.tshirts } else { &split.pullovers };
    pool.choose(rng).copied().map(|top| (top, None, next))
}

fn attach_coat(candidate: &mut OutfitCandidate, coat: &Garment) {
    let bonus_score = clamp_score(candidate.score as i32 + COAT_BONUS);
    candidate.components.coat = bonus_score as i32 - candidate.score as i32;
    candidate.score = bonus_score;
    candidate.coat = Some(coat.clone());
    candidate.explanations.push(COAT_EXPLANATION.to_string());
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::domain::garment::{Garment, GarmentClass};
    use crate::domain::outfit::ComboKey;
    use crate::domain::preferences::{Occasion, Preferences, Style, TopPreference};
    use crate::outfits::fixtures::*;
    use crate::outfits::scoring::{CompatibilityScorer, OutfitPieces};
    use crate::outfits::{OutfitError, MAX_ACCEPTED_CANDIDATES, MAX_RECOMMENDATIONS};

    use super::{generate_outfits, OutfitEngine};

    fn wardrobe() -> Vec<Garment> {
        vec![
            tshirt("t1", "white"),
            tshirt("t2", "black"),
            tshirt("t3", "red"),
            pullover("p1", "gray"),
            pullover("p2", "blue"),
            trouser("b1", "black"),
            trouser("b2", "blue"),
            trouser("b3", "beige"),
            sneaker("s1", "white"),
            sneaker("s2", "black"),
            coat("c1", "beige"),
        ]
    }

    #[test]
    fn returns_at_most_three_clamped_candidates_sorted_by_score() {
        let inventory = wardrobe();
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outfits = generate_outfits(&inventory, &Preferences::new(), &mut rng)
                .expect("valid inventory");

            assert!(!outfits.is_empty());
            assert!(outfits.len() <= MAX_RECOMMENDATIONS);
            assert!(outfits.iter().all(|outfit| (38..=97).contains(&outfit.score)));
            assert!(outfits.windows(2).all(|pair| pair[0].score >= pair[1].score));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let inventory = wardrobe();
        let preferences = Preferences::new()
            .with_occasion(Occasion::Casual)
            .with_style(Style::Minimalist)
            .with_coat(true);

        let first = generate_outfits(&inventory, &preferences, &mut StdRng::seed_from_u64(7))
            .expect("first run");
        let second = generate_outfits(&inventory, &preferences, &mut StdRng::seed_from_u64(7))
            .expect("second run");

        assert_eq!(first, second);
    }

    #[test]
    fn combo_keys_are_unique_and_respect_exclusions() {
        let inventory = wardrobe();
        let engine = OutfitEngine::new();

        for seed in 0..20 {
            let first = engine
                .sample(&inventory, &Preferences::new(), &mut StdRng::seed_from_u64(seed))
                .expect("first batch");
            let keys: HashSet<ComboKey> =
                first.iter().map(|outfit| outfit.combo_key.clone()).collect();
            assert_eq!(keys.len(), first.len());
            assert!(first.len() <= MAX_ACCEPTED_CANDIDATES);

            let shown: Vec<ComboKey> = first.iter().map(|o| o.combo_key.clone()).collect();
            let more = engine
                .generate(
                    &inventory,
                    &Preferences::new().with_excluded_keys(shown),
                    &mut StdRng::seed_from_u64(seed + 1000),
                )
                .expect("second batch");
            assert!(more.iter().all(|outfit| !keys.contains(&outfit.combo_key)));
        }
    }

    #[test]
    fn single_possible_outfit_is_returned_once() {
        let inventory = vec![tshirt("t1", "black"), trouser("b1", "black"), sneaker("s1", "white")];

        let outfits = generate_outfits(&inventory, &Preferences::new(), &mut StdRng::seed_from_u64(3))
            .expect("valid inventory");

        assert_eq!(outfits.len(), 1);
        let outfit = &outfits[0];
        assert_eq!(outfit.combo_key.as_str(), "t1-b1-s1");
        assert!(outfit.components.formality > 0);
        assert_eq!(outfit.components.color_harmony, 28);
        assert!(outfit.explanations.iter().any(|reason| reason == "Colors that match perfectly"));
    }

    #[test]
    fn excluding_the_only_combination_yields_nothing() {
        let inventory = vec![tshirt("t1", "black"), trouser("b1", "black"), sneaker("s1", "white")];
        let preferences =
            Preferences::new().with_excluded_keys([ComboKey("t1-b1-s1".to_string())]);

        let outfits = generate_outfits(&inventory, &preferences, &mut StdRng::seed_from_u64(3))
            .expect("valid inventory");

        assert!(outfits.is_empty());
    }

    #[test]
    fn validation_errors_propagate() {
        let no_bottoms = vec![tshirt("t1", "black"), sneaker("s1", "white")];
        assert_eq!(
            generate_outfits(&no_bottoms, &Preferences::new(), &mut StepRng::new(0, 0)),
            Err(OutfitError::InsufficientInventory)
        );

        let no_pullover =
            vec![tshirt("t1", "black"), trouser("b1", "black"), sneaker("s1", "white")];
        assert_eq!(
            generate_outfits(
                &no_pullover,
                &Preferences::new().with_layered_top(true),
                &mut StepRng::new(0, 0)
            ),
            Err(OutfitError::LayeredRequirementNotMet)
        );
    }

    #[test]
    fn first_two_attempts_cover_both_top_kinds() {
        let inventory = wardrobe();
        let engine = OutfitEngine::new();

        for seed in 0..20 {
            let sampled = engine
                .sample(&inventory, &Preferences::new(), &mut StdRng::seed_from_u64(seed))
                .expect("sample");
            assert_eq!(sampled[0].top.class, GarmentClass::TShirt);
            assert_eq!(sampled[1].top.class, GarmentClass::Pullover);
        }
    }

    #[test]
    fn forced_draws_pick_first_garments() {
        let inventory = wardrobe();
        let sampled = OutfitEngine::new()
            .sample(&inventory, &Preferences::new(), &mut StepRng::new(0, 0))
            .expect("sample");

        // a constant source repeats the same draws, so only the two rotation picks survive
        let keys: Vec<&str> = sampled.iter().map(|outfit| outfit.combo_key.as_str()).collect();
        assert_eq!(keys, vec!["t1-b1-s1", "p1-b1-s1"]);
    }

    #[test]
    fn top_preference_limits_subtype() {
        let inventory = wardrobe();
        let preferences = Preferences::new().with_top_preference(TopPreference::Pullover);

        let outfits =
            generate_outfits(&inventory, &preferences, &mut StdRng::seed_from_u64(11)).expect("ok");

        assert!(outfits.iter().all(|outfit| outfit.top.class == GarmentClass::Pullover));
    }

    #[test]
    fn layered_outfits_carry_tshirt_and_pullover() {
        let inventory = wardrobe();
        let preferences = Preferences::new().with_layered_top(true);

        let outfits =
            generate_outfits(&inventory, &preferences, &mut StdRng::seed_from_u64(5)).expect("ok");

        assert!(!outfits.is_empty());
        for outfit in &outfits {
            assert_eq!(outfit.top.class, GarmentClass::TShirt);
            let secondary = outfit.secondary_top.as_ref().expect("layered piece");
            assert_eq!(secondary.class, GarmentClass::Pullover);
            assert!(outfit.combo_key.as_str().contains(&secondary.id.0));
            assert_eq!(outfit.components.layering, 8);
        }
    }

    #[test]
    fn coat_adds_bonus_without_changing_identity() {
        let inventory = vec![
            tshirt("t1", "black"),
            trouser("b1", "black"),
            sneaker("s1", "white"),
            coat("c1", "beige"),
        ];
        let preferences = Preferences::new().with_coat(true);

        let outfits = generate_outfits(&inventory, &preferences, &mut StdRng::seed_from_u64(9))
            .expect("valid inventory");
        let outfit = &outfits[0];

        let pieces = OutfitPieces {
            top: &inventory[0],
            secondary_top: None,
            bottom: &inventory[1],
            shoes: &inventory[2],
        };
        let base = CompatibilityScorer::new().score(&pieces, &preferences, &pieces.combo_key());

        assert_eq!(outfit.coat.as_ref().map(|coat| coat.id.0.as_str()), Some("c1"));
        assert_eq!(outfit.combo_key.as_str(), "t1-b1-s1");
        assert_eq!(outfit.score, (base.score + 4).min(97));
        assert_eq!(outfit.explanations.last().map(String::as_str), Some("Includes coat"));
    }

    #[test]
    fn coat_is_skipped_unless_requested() {
        let inventory = wardrobe();
        let outfits =
            generate_outfits(&inventory, &Preferences::new(), &mut StdRng::seed_from_u64(2))
                .expect("ok");
        assert!(outfits.iter().all(|outfit| outfit.coat.is_none()));
    }
}
