//! Outfit generation and compatibility scoring.
//!
//! Given one owner's classified garments and a set of soft preferences, the engine
//! samples candidate outfits, scores each with a multi-factor heuristic, drops
//! combinations the caller has already seen and returns a ranked top-N.

mod engine;
mod partition;
mod scoring;

pub use engine::{generate_outfits, OutfitEngine};
pub use partition::{partition, InventoryPartition};
pub use scoring::{
    color_harmony, combo_hash, formality_contribution, CompatibilityScorer, OutfitPieces,
    ScoredOutfit, COLOR_PALETTES,
};

use thiserror::Error;

/// Result type for outfit operations
pub type OutfitResult<T> = Result<T, OutfitError>;

/// Sampling attempts per request; bounds worst-case work on small inventories.
pub const MAX_SAMPLING_ATTEMPTS: usize = 50;

/// Accepted candidates after which sampling stops.
pub const MAX_ACCEPTED_CANDIDATES: usize = 10;

/// Recommendations returned per request
pub const MAX_RECOMMENDATIONS: usize = 3;

pub const BASE_SCORE: i32 = 25;
pub const MIN_SCORE: i32 = 38;
pub const MAX_SCORE: i32 = 97;

/// Bonus for attaching a coat, applied after clamping and capped at `MAX_SCORE`.
pub const COAT_BONUS: i32 = 4;

/// Totals at or above this earn the high-harmony explanation.
pub const HIGH_HARMONY_THRESHOLD: i32 = 75;

/// Inventory preconditions. Never transient; messages are user-facing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OutfitError {
    #[error(
        "Not enough garments to generate outfits. You need at least 1 top, 1 bottom and 1 shoe."
    )]
    InsufficientInventory,
    #[error("Layered outfit requires at least 1 T-shirt and 1 Pullover.")]
    LayeredRequirementNotMet,
    #[error(
        "No T-shirt or Pullover available. You need at least one of these top garment types."
    )]
    NoTopAvailable,
    #[error("No pants (Trouser) available.")]
    NoTrousersAvailable,
    #[error("No sneakers (Sneaker) available.")]
    NoSneakersAvailable,
}

impl OutfitError {
    /// Stable machine-readable class for API and CLI payloads.
    pub fn code(&self) -> &'static str {
        match self {
            OutfitError::InsufficientInventory => "insufficient_inventory",
            OutfitError::LayeredRequirementNotMet => "layered_requirement_not_met",
            OutfitError::NoTopAvailable => "no_top_available",
            OutfitError::NoTrousersAvailable => "no_trousers_available",
            OutfitError::NoSneakersAvailable => "no_sneakers_available",
        }
    }
}
