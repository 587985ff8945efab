use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A completed checkout, recorded by the payment webhook pipeline. This
/// service only reads them for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product: String,
    pub checkout_session_id: String,
    pub total_order: i64,
    pub description: Option<String>,
    pub purchase_date: OffsetDateTime,
}

impl Purchase {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Purchase>> {
        let rows = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, user_id, product, checkout_session_id, total_order, description, purchase_date
            FROM purchases
            WHERE user_id = $1
            ORDER BY purchase_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
