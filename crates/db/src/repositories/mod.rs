use async_trait::async_trait;
use thiserror::Error;

use wardrobe_core::domain::garment::{Garment, GarmentCategory, GarmentId, OwnerId};
use wardrobe_core::domain::outfit::{OutfitId, SavedOutfit};
use wardrobe_core::domain::preferences::{Occasion, Preferences};
use wardrobe_core::errors::ApplicationError;

pub mod garment;
pub mod memory;
pub mod outfit;
pub mod profile;

pub use garment::SqlGarmentRepository;
pub use memory::{InMemoryGarmentRepository, InMemoryOutfitRepository, InMemoryProfileRepository};
pub use outfit::SqlOutfitRepository;
pub use profile::SqlProfileRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Upstream collaborator: one owner's classified garments.
#[async_trait]
pub trait GarmentRepository: Send + Sync {
    /// Garments for `owner`, newest first, optionally restricted to one category.
    async fn find_by_owner(
        &self,
        owner: &OwnerId,
        category: Option<GarmentCategory>,
    ) -> Result<Vec<Garment>, RepositoryError>;

    async fn find_by_id(
        &self,
        owner: &OwnerId,
        id: &GarmentId,
    ) -> Result<Option<Garment>, RepositoryError>;

    async fn save(&self, garment: Garment) -> Result<(), RepositoryError>;

    /// Replaces the occasion tags. Returns `false` when the garment does not exist.
    async fn update_occasions(
        &self,
        owner: &OwnerId,
        id: &GarmentId,
        occasions: &[Occasion],
    ) -> Result<bool, RepositoryError>;

    async fn delete(&self, owner: &OwnerId, id: &GarmentId) -> Result<bool, RepositoryError>;
}

/// Downstream collaborator: outfits the user chose to keep.
#[async_trait]
pub trait OutfitRepository: Send + Sync {
    async fn save(&self, outfit: SavedOutfit) -> Result<(), RepositoryError>;

    /// Newest first.
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<SavedOutfit>, RepositoryError>;

    async fn delete(&self, owner: &OwnerId, id: &OutfitId) -> Result<bool, RepositoryError>;
}

/// Stored default preferences, one profile per owner.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find(&self, owner: &OwnerId) -> Result<Option<Preferences>, RepositoryError>;

    /// Stores `preferences` without session exclusions.
    async fn upsert(
        &self,
        owner: &OwnerId,
        preferences: &Preferences,
    ) -> Result<(), RepositoryError>;
}

/// Fetches the categories outfit generation draws from: tops, bottoms, shoes,
/// plus coats when the preferences ask for one.
pub async fn load_inventory(
    repo: &dyn GarmentRepository,
    owner: &OwnerId,
    preferences: &Preferences,
) -> Result<Vec<Garment>, RepositoryError> {
    let mut categories = vec![GarmentCategory::Top, GarmentCategory::Bottom, GarmentCategory::Shoes];
    if preferences.include_coat {
        categories.push(GarmentCategory::Coat);
    }

    let mut inventory = Vec::new();
    for category in categories {
        inventory.extend(repo.find_by_owner(owner, Some(category)).await?);
    }
    Ok(inventory)
}
