use chrono::{DateTime, Utc};
use sqlx::Row;

use wardrobe_core::domain::garment::{
    Garment, GarmentCategory, GarmentClass, GarmentId, OwnerId,
};
use wardrobe_core::domain::preferences::Occasion;

use super::{GarmentRepository, RepositoryError};
use crate::DbPool;

const GARMENT_COLUMNS: &str =
    "id, owner_id, category, class_name, color, confidence, occasions_json, image_url, added_at";

pub struct SqlGarmentRepository {
    pool: DbPool,
}

impl SqlGarmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid {column} `{raw}`: {e}")))
}

fn occasions_to_json(occasions: &[Occasion]) -> Result<String, RepositoryError> {
    serde_json::to_string(occasions).map_err(decode_err)
}

fn row_to_garment(row: &sqlx::sqlite::SqliteRow) -> Result<Garment, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_err)?;
    let owner_id: String = row.try_get("owner_id").map_err(decode_err)?;
    let category_str: String = row.try_get("category").map_err(decode_err)?;
    let class_name: String = row.try_get("class_name").map_err(decode_err)?;
    let color: String = row.try_get("color").map_err(decode_err)?;
    let confidence: f64 = row.try_get("confidence").map_err(decode_err)?;
    let occasions_json: String = row.try_get("occasions_json").map_err(decode_err)?;
    let image_url: Option<String> = row.try_get("image_url").map_err(decode_err)?;
    let added_at_str: String = row.try_get("added_at").map_err(decode_err)?;

    let category = GarmentCategory::parse(&category_str)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown category `{category_str}`")))?;
    let occasions: Vec<String> = serde_json::from_str(&occasions_json).map_err(decode_err)?;

    Ok(Garment {
        id: GarmentId(id),
        owner_id: OwnerId(owner_id),
        category,
        class: GarmentClass::from_label(&class_name),
        color,
        confidence,
        occasions: Occasion::parse_list(&occasions),
        image_url,
        added_at: parse_timestamp("added_at", &added_at_str)?,
    })
}

#[async_trait::async_trait]
impl GarmentRepository for SqlGarmentRepository {
    async fn find_by_owner(
        &self,
        owner: &OwnerId,
        category: Option<GarmentCategory>,
    ) -> Result<Vec<Garment>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = if let Some(category) = category {
            sqlx::query(&format!(
                "SELECT {GARMENT_COLUMNS} FROM garment
                 WHERE owner_id = ? AND category = ?
                 ORDER BY added_at DESC, id ASC"
            ))
            .bind(&owner.0)
            .bind(category.as_str())
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                "SELECT {GARMENT_COLUMNS} FROM garment
                 WHERE owner_id = ?
                 ORDER BY added_at DESC, id ASC"
            ))
            .bind(&owner.0)
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(row_to_garment).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(
        &self,
        owner: &OwnerId,
        id: &GarmentId,
    ) -> Result<Option<Garment>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {GARMENT_COLUMNS} FROM garment WHERE owner_id = ? AND id = ?"
        ))
        .bind(&owner.0)
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_garment(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, garment: Garment) -> Result<(), RepositoryError> {
        let occasions_json = occasions_to_json(&garment.occasions)?;

        sqlx::query(
            "INSERT INTO garment (id, owner_id, category, class_name, color, confidence,
                                  occasions_json, image_url, added_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 category = excluded.category,
                 class_name = excluded.class_name,
                 color = excluded.color,
                 confidence = excluded.confidence,
                 occasions_json = excluded.occasions_json,
                 image_url = excluded.image_url",
        )
        .bind(&garment.id.0)
        .bind(&garment.owner_id.0)
        .bind(garment.category.as_str())
        .bind(garment.class.label())
        .bind(&garment.color)
        .bind(garment.confidence)
        .bind(occasions_json)
        .bind(&garment.image_url)
        .bind(garment.added_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_occasions(
        &self,
        owner: &OwnerId,
        id: &GarmentId,
        occasions: &[Occasion],
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE garment SET occasions_json = ? WHERE owner_id = ? AND id = ?")
                .bind(occasions_to_json(occasions)?)
                .bind(&owner.0)
                .bind(&id.0)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, owner: &OwnerId, id: &GarmentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM garment WHERE owner_id = ? AND id = ?")
            .bind(&owner.0)
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
