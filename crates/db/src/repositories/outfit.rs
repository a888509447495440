use sqlx::Row;

use wardrobe_core::domain::garment::{GarmentId, OwnerId};
use wardrobe_core::domain::outfit::{OutfitId, SavedOutfit};

use super::garment::parse_timestamp;
use super::{OutfitRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOutfitRepository {
    pool: DbPool,
}

impl SqlOutfitRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_outfit(row: &sqlx::sqlite::SqliteRow) -> Result<SavedOutfit, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::Decode(e.to_string());

    let id: String = row.try_get("id").map_err(get_err)?;
    let owner_id: String = row.try_get("owner_id").map_err(get_err)?;
    let top_id: String = row.try_get("top_id").map_err(get_err)?;
    let secondary_top_id: Option<String> = row.try_get("secondary_top_id").map_err(get_err)?;
    let bottom_id: String = row.try_get("bottom_id").map_err(get_err)?;
    let shoes_id: String = row.try_get("shoes_id").map_err(get_err)?;
    let coat_id: Option<String> = row.try_get("coat_id").map_err(get_err)?;
    let score: i64 = row.try_get("score").map_err(get_err)?;
    let created_at_str: String = row.try_get("created_at").map_err(get_err)?;

    let score = u8::try_from(score)
        .ok()
        .filter(|score| *score <= 100)
        .ok_or_else(|| RepositoryError::Decode(format!("score out of range: {score}")))?;

    Ok(SavedOutfit {
        id: OutfitId(id),
        owner_id: OwnerId(owner_id),
        top_id: GarmentId(top_id),
        secondary_top_id: secondary_top_id.map(GarmentId),
        bottom_id: GarmentId(bottom_id),
        shoes_id: GarmentId(shoes_id),
        coat_id: coat_id.map(GarmentId),
        score,
        created_at: parse_timestamp("created_at", &created_at_str)?,
    })
}

#[async_trait::async_trait]
impl OutfitRepository for SqlOutfitRepository {
    async fn save(&self, outfit: SavedOutfit) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO saved_outfit (id, owner_id, top_id, secondary_top_id, bottom_id,
                                       shoes_id, coat_id, score, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&outfit.id.0)
        .bind(&outfit.owner_id.0)
        .bind(&outfit.top_id.0)
        .bind(outfit.secondary_top_id.as_ref().map(|id| id.0.as_str()))
        .bind(&outfit.bottom_id.0)
        .bind(&outfit.shoes_id.0)
        .bind(outfit.coat_id.as_ref().map(|id| id.0.as_str()))
        .bind(i64::from(outfit.score))
        .bind(outfit.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<SavedOutfit>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT id, owner_id, top_id, secondary_top_id, bottom_id, shoes_id, coat_id,
                    score, created_at
             FROM saved_outfit
             WHERE owner_id = ?
             ORDER BY created_at DESC, id ASC",
        )
        .bind(&owner.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_outfit).collect::<Result<Vec<_>, _>>()
    }

    async fn delete(&self, owner: &OwnerId, id: &OutfitId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_outfit WHERE owner_id = ? AND id = ?")
            .bind(&owner.0)
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
