use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Stored progress for one (user, product) pair. Absence of a row means the
/// user is implicitly on module 1 with no wait in effect.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product: String,
    pub current_module: i32,
    pub last_completed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl ProgressRecord {
    pub async fn find(
        db: &PgPool,
        user_id: Uuid,
        product: &str,
    ) -> anyhow::Result<Option<ProgressRecord>> {
        let record = sqlx::query_as::<_, ProgressRecord>(
            r#"
            SELECT id, user_id, product, current_module, last_completed_at, created_at, updated_at
            FROM progress
            WHERE user_id = $1 AND product = $2
            "#,
        )
        .bind(user_id)
        .bind(product)
        .fetch_optional(db)
        .await?;
        Ok(record)
    }

    /// First-ever advance: creates the row. Returns `None` when a concurrent
    /// request created it first; the caller must re-read and re-evaluate.
    pub async fn try_create_advanced(
        db: &PgPool,
        user_id: Uuid,
        product: &str,
        module: i32,
    ) -> anyhow::Result<Option<ProgressRecord>> {
        let record = sqlx::query_as::<_, ProgressRecord>(
            r#"
            INSERT INTO progress (user_id, product, current_module, last_completed_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id, product) DO NOTHING
            RETURNING id, user_id, product, current_module, last_completed_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(product)
        .bind(module)
        .fetch_optional(db)
        .await?;
        Ok(record)
    }

    /// Compare-and-swap advance: succeeds only if the stored module still
    /// equals `from_module`, so two racing requests cannot both pass the
    /// wait check. Returns `None` when the row changed underneath us.
    pub async fn try_advance(
        db: &PgPool,
        user_id: Uuid,
        product: &str,
        from_module: i32,
        to_module: i32,
    ) -> anyhow::Result<Option<ProgressRecord>> {
        let record = sqlx::query_as::<_, ProgressRecord>(
            r#"
            UPDATE progress
            SET current_module = $4, last_completed_at = now(), updated_at = now()
            WHERE user_id = $1 AND product = $2 AND current_module = $3
            RETURNING id, user_id, product, current_module, last_completed_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(product)
        .bind(from_module)
        .bind(to_module)
        .fetch_optional(db)
        .await?;
        Ok(record)
    }
}
