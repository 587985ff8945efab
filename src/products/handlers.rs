use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::products::catalog::Product;
use crate::state::AppState;

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:product_type", get(get_product))
}

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog.all().to_vec())
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_type): Path<String>,
) -> Result<Json<Product>, (StatusCode, Json<serde_json::Value>)> {
    state.catalog.get(&product_type).cloned().map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Product not found" })),
    ))
}
