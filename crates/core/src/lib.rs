pub mod config;
pub mod domain;
pub mod errors;
pub mod outfits;

pub use domain::garment::{
    Garment, GarmentCategory, GarmentClass, GarmentId, GarmentSubmission, OwnerId,
};
pub use domain::outfit::{ComboKey, OutfitCandidate, OutfitId, SavedOutfit, ScoreComponents};
pub use domain::preferences::{Occasion, Preferences, PreferencesInput, Style, TopPreference};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use outfits::{generate_outfits, CompatibilityScorer, OutfitEngine, OutfitError};
