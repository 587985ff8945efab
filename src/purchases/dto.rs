use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Purchase;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDto {
    pub id: Uuid,
    pub product: String,
    pub total_order: i64,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub purchase_date: OffsetDateTime,
}

impl From<Purchase> for PurchaseDto {
    fn from(p: Purchase) -> Self {
        Self {
            id: p.id,
            product: p.product,
            total_order: p.total_order,
            description: p.description,
            purchase_date: p.purchase_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurchasesResponse {
    pub purchases: Vec<PurchaseDto>,
}
