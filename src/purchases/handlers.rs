use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use tracing::{error, instrument};

use crate::auth::AuthUser;
use crate::state::AppState;

use super::dto::PurchasesResponse;
use super::repo::Purchase;

pub fn purchase_routes() -> Router<AppState> {
    Router::new().route("/purchases", get(list_purchases))
}

#[instrument(skip(state))]
pub async fn list_purchases(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PurchasesResponse>, (StatusCode, Json<serde_json::Value>)> {
    let purchases = Purchase::list_by_user(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "list_purchases failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
        })?;

    Ok(Json(PurchasesResponse {
        purchases: purchases.into_iter().map(Into::into).collect(),
    }))
}
