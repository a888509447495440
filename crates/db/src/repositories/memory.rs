use std::collections::HashMap;

use tokio::sync::RwLock;

use wardrobe_core::domain::garment::{Garment, GarmentCategory, GarmentId, OwnerId};
use wardrobe_core::domain::outfit::{OutfitId, SavedOutfit};
use wardrobe_core::domain::preferences::{Occasion, Preferences};

use super::{GarmentRepository, OutfitRepository, ProfileRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryGarmentRepository {
    garments: RwLock<HashMap<String, Garment>>,
}

#[async_trait::async_trait]
impl GarmentRepository for InMemoryGarmentRepository {
    async fn find_by_owner(
        &self,
        owner: &OwnerId,
        category: Option<GarmentCategory>,
    ) -> Result<Vec<Garment>, RepositoryError> {
        let garments = self.garments.read().await;
        let mut matching: Vec<Garment> = garments
            .values()
            .filter(|garment| garment.owner_id == *owner)
            .filter(|garment| category.map_or(true, |category| garment.category == category))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.added_at.cmp(&a.added_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn find_by_id(
        &self,
        owner: &OwnerId,
        id: &GarmentId,
    ) -> Result<Option<Garment>, RepositoryError> {
        let garments = self.garments.read().await;
        Ok(garments.get(&id.0).filter(|garment| garment.owner_id == *owner).cloned())
    }

    async fn save(&self, garment: Garment) -> Result<(), RepositoryError> {
        let mut garments = self.garments.write().await;
        garments.insert(garment.id.0.clone(), garment);
        Ok(())
    }

    async fn update_occasions(
        &self,
        owner: &OwnerId,
        id: &GarmentId,
        occasions: &[Occasion],
    ) -> Result<bool, RepositoryError> {
        let mut garments = self.garments.write().await;
        match garments.get_mut(&id.0).filter(|garment| garment.owner_id == *owner) {
            Some(garment) => {
                garment.occasions = occasions.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, owner: &OwnerId, id: &GarmentId) -> Result<bool, RepositoryError> {
        let mut garments = self.garments.write().await;
        let owned = garments.get(&id.0).is_some_and(|garment| garment.owner_id == *owner);
        if owned {
            garments.remove(&id.0);
        }
        Ok(owned)
    }
}

#[derive(Default)]
pub struct InMemoryOutfitRepository {
    outfits: RwLock<HashMap<String, SavedOutfit>>,
}

#[async_trait::async_trait]
impl OutfitRepository for InMemoryOutfitRepository {
    async fn save(&self, outfit: SavedOutfit) -> Result<(), RepositoryError> {
        let mut outfits = self.outfits.write().await;
        outfits.insert(outfit.id.0.clone(), outfit);
        Ok(())
    }

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<SavedOutfit>, RepositoryError> {
        let outfits = self.outfits.read().await;
        let mut listed: Vec<SavedOutfit> =
            outfits.values().filter(|outfit| outfit.owner_id == *owner).cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(listed)
    }

    async fn delete(&self, owner: &OwnerId, id: &OutfitId) -> Result<bool, RepositoryError> {
        let mut outfits = self.outfits.write().await;
        let owned = outfits.get(&id.0).is_some_and(|outfit| outfit.owner_id == *owner);
        if owned {
            outfits.remove(&id.0);
        }
        Ok(owned)
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, Preferences>>,
}

#[async_trait::async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find(&self, owner: &OwnerId) -> Result<Option<Preferences>, RepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&owner.0).cloned())
    }

    async fn upsert(
        &self,
        owner: &OwnerId,
        preferences: &Preferences,
    ) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(owner.0.clone(), preferences.without_exclusions());
        Ok(())
    }
}
