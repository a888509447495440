use chrono::{DateTime, Duration, TimeZone, Utc};

use wardrobe_core::domain::garment::{
    Garment, GarmentCategory, GarmentClass, GarmentId, OwnerId,
};
use wardrobe_core::domain::preferences::{Occasion, Preferences};
use wardrobe_core::outfits::partition;

use crate::connection::DbPool;
use crate::repositories::{GarmentRepository, RepositoryError, SqlGarmentRepository};

/// Canonical demo wardrobe: enough pieces for plain, layered and coat outfits.
const SEED_GARMENTS: &[SeedGarment] = &[
    SeedGarment {
        slug: "tee-white",
        category: GarmentCategory::Top,
        class: GarmentClass::TShirt,
        color: "white",
        occasions: &[Occasion::Casual, Occasion::Sporty],
    },
    SeedGarment {
        slug: "tee-black",
        category: GarmentCategory::Top,
        class: GarmentClass::TShirt,
        color: "black",
        occasions: &[Occasion::Casual],
    },
    SeedGarment {
        slug: "pullover-gray",
        category: GarmentCategory::Top,
        class: GarmentClass::Pullover,
        color: "gray",
        occasions: &[Occasion::Casual, Occasion::Work],
    },
    SeedGarment {
        slug: "shirt-blue",
        category: GarmentCategory::Top,
        class: GarmentClass::Shirt,
        color: "blue",
        occasions: &[Occasion::Formal, Occasion::Work],
    },
    SeedGarment {
        slug: "trouser-black",
        category: GarmentCategory::Bottom,
        class: GarmentClass::Trouser,
        color: "black",
        occasions: &[Occasion::Work, Occasion::Formal],
    },
    SeedGarment {
        slug: "trouser-beige",
        category: GarmentCategory::Bottom,
        class: GarmentClass::Trouser,
        color: "beige",
        occasions: &[Occasion::Casual],
    },
    SeedGarment {
        slug: "sneaker-white",
        category: GarmentCategory::Shoes,
        class: GarmentClass::Sneaker,
        color: "white",
        occasions: &[Occasion::Casual, Occasion::Sporty],
    },
    SeedGarment {
        slug: "boot-brown",
        category: GarmentCategory::Shoes,
        class: GarmentClass::AnkleBoot,
        color: "brown",
        occasions: &[Occasion::Formal],
    },
    SeedGarment {
        slug: "coat-beige",
        category: GarmentCategory::Coat,
        class: GarmentClass::Coat,
        color: "beige",
        occasions: &[Occasion::Work],
    },
    SeedGarment {
        slug: "bag-black",
        category: GarmentCategory::Accessory,
        class: GarmentClass::Bag,
        color: "black",
        occasions: &[],
    },
];

const SEED_CONFIDENCE: f64 = 0.9;

pub const DEFAULT_DEMO_OWNER: &str = "demo";

#[derive(Debug, Clone, Copy)]
struct SeedGarment {
    slug: &'static str,
    category: GarmentCategory,
    class: GarmentClass,
    color: &'static str,
    occasions: &'static [Occasion],
}

impl SeedGarment {
    fn id(&self, owner: &OwnerId) -> GarmentId {
        GarmentId(format!("demo_{}_{}", owner.0, self.slug.replace('-', "_")))
    }

    fn to_garment(self, owner: &OwnerId, added_at: DateTime<Utc>) -> Garment {
        Garment {
            id: self.id(owner),
            owner_id: owner.clone(),
            category: self.category,
            class: self.class,
            color: self.color.to_string(),
            confidence: SEED_CONFIDENCE,
            occasions: self.occasions.to_vec(),
            image_url: None,
            added_at,
        }
    }
}

fn seed_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().unwrap_or_else(Utc::now)
}

/// Deterministic demo wardrobe for local runs and end-to-end checks.
pub struct DemoWardrobe;

impl DemoWardrobe {
    /// Inserts any missing demo garments for `owner`. Safe to run repeatedly.
    pub async fn load(pool: &DbPool, owner: &OwnerId) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for (index, seed) in SEED_GARMENTS.iter().enumerate() {
            let garment = seed.to_garment(owner, seed_epoch() + Duration::minutes(index as i64));
            let occasions_json = serde_json::to_string(&garment.occasions)
                .map_err(|error| RepositoryError::Decode(error.to_string()))?;

            let result = sqlx::query(
                "INSERT OR IGNORE INTO garment (id, owner_id, category, class_name, color,
                                                confidence, occasions_json, image_url, added_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?)",
            )
            .bind(&garment.id.0)
            .bind(&garment.owner_id.0)
            .bind(garment.category.as_str())
            .bind(garment.class.label())
            .bind(&garment.color)
            .bind(garment.confidence)
            .bind(occasions_json)
            .bind(garment.added_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;

        Ok(SeedResult {
            owner: owner.clone(),
            inserted,
            total: SEED_GARMENTS.len(),
            slugs: SEED_GARMENTS.iter().map(|seed| seed.slug).collect(),
        })
    }

    /// Verify that every demo garment exists with its expected class, and that
    /// the seeded wardrobe supports layered outfits with a coat.
    pub async fn verify(
        pool: &DbPool,
        owner: &OwnerId,
    ) -> Result<VerificationResult, RepositoryError> {
        let repo = SqlGarmentRepository::new(pool.clone());
        let mut checks = Vec::new();

        for seed in SEED_GARMENTS {
            let present = repo.find_by_id(owner, &seed.id(owner)).await?.is_some_and(|garment| {
                garment.category == seed.category && garment.class == seed.class
            });
            checks.push((seed.slug, present));
        }

        let inventory = repo.find_by_owner(owner, None).await?;
        let preferences = Preferences::new().with_layered_top(true).with_coat(true);
        let ready = partition(&inventory, &preferences).is_ok_and(|split| !split.coats.is_empty());
        checks.push(("layered-coat-ready", ready));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the demo garments for `owner`; saved outfits using them cascade.
    pub async fn clean(pool: &DbPool, owner: &OwnerId) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        for seed in SEED_GARMENTS {
            sqlx::query("DELETE FROM garment WHERE owner_id = ? AND id = ?")
                .bind(&owner.0)
                .bind(&seed.id(owner).0)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub owner: OwnerId,
    pub inserted: usize,
    pub total: usize,
    pub slugs: Vec<&'static str>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(name, _)| *name).collect()
    }
}
