use chrono::Utc;
use sqlx::Row;

use wardrobe_core::domain::garment::OwnerId;
use wardrobe_core::domain::preferences::Preferences;

use super::{ProfileRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProfileRepository {
    pool: DbPool,
}

impl SqlProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileRepository for SqlProfileRepository {
    async fn find(&self, owner: &OwnerId) -> Result<Option<Preferences>, RepositoryError> {
        let row = sqlx::query("SELECT preferences_json FROM preference_profile WHERE owner_id = ?")
            .bind(&owner.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String =
            row.try_get("preferences_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::Decode(format!("invalid preference profile: {e}")))
    }

    async fn upsert(
        &self,
        owner: &OwnerId,
        preferences: &Preferences,
    ) -> Result<(), RepositoryError> {
        let stored = serde_json::to_string(&preferences.without_exclusions())
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;

        sqlx::query(
            "INSERT INTO preference_profile (owner_id, preferences_json, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(owner_id) DO UPDATE SET
                 preferences_json = excluded.preferences_json,
                 updated_at = excluded.updated_at",
        )
        .bind(&owner.0)
        .bind(stored)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
