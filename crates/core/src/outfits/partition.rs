//! Splits an owner's inventory into the garment subsets outfits are built from.

use crate::domain::garment::{Garment, GarmentCategory, GarmentClass};
use crate::domain::preferences::{Preferences, TopPreference};

use super::{OutfitError, OutfitResult};

/// Garments grouped by the slot they can fill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryPartition<'a> {
    pub tshirts: Vec<&'a Garment>,
    pub pullovers: Vec<&'a Garment>,
    pub trousers: Vec<&'a Garment>,
    pub sneakers: Vec<&'a Garment>,
    /// Only populated when coats were requested.
    pub coats: Vec<&'a Garment>,
}

impl InventoryPartition<'_> {
    pub fn has_both_top_kinds(&self) -> bool {
        !self.tshirts.is_empty() && !self.pullovers.is_empty()
    }
}

/// Partitions `inventory` and validates that at least one outfit can be built.
pub fn partition<'a>(
    inventory: &'a [Garment],
    preferences: &Preferences,
) -> OutfitResult<InventoryPartition<'a>> {
    let has_category = move |category: GarmentCategory| {
        inventory.iter().any(|garment| garment.category == category)
    };
    if !has_category(GarmentCategory::Top)
        || !has_category(GarmentCategory::Bottom)
        || !has_category(GarmentCategory::Shoes)
    {
        return Err(OutfitError::InsufficientInventory);
    }

    let select = move |category: GarmentCategory, class: GarmentClass| -> Vec<&'a Garment> {
        inventory
            .iter()
            .filter(|garment| garment.category == category && garment.class == class)
            .collect()
    };

    let mut tshirts = select(GarmentCategory::Top, GarmentClass::TShirt);
    let mut pullovers = select(GarmentCategory::Top, GarmentClass::Pullover);

    if preferences.layered_top {
        if tshirts.is_empty() || pullovers.is_empty() {
            return Err(OutfitError::LayeredRequirementNotMet);
        }
    } else {
        if tshirts.is_empty() && pullovers.is_empty() {
            return Err(OutfitError::NoTopAvailable);
        }

        // Advisory only: a preference that would leave no tops is ignored.
        match preferences.top_preference {
            TopPreference::Tshirt if !tshirts.is_empty() => pullovers.clear(),
            TopPreference::Pullover if !pullovers.is_empty() => tshirts.clear(),
            _ => {}
        }
    }

    let trousers = select(GarmentCategory::Bottom, GarmentClass::Trouser);
    if trousers.is_empty() {
        return Err(OutfitError::NoTrousersAvailable);
    }

    let sneakers = select(GarmentCategory::Shoes, GarmentClass::Sneaker);
    if sneakers.is_empty() {
        return Err(OutfitError::NoSneakersAvailable);
    }

    let coats = if preferences.include_coat {
        inventory.iter().filter(|garment| garment.category == GarmentCategory::Coat).collect()
    } else {
        Vec::new()
    };

    Ok(InventoryPartition { tshirts, pullovers, trousers, sneakers, coats })
}
