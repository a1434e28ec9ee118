//! Public catalog endpoints.

use super::AppState;
use crate::{
    core::catalog::{self, ProductFilter, ProductWithImages},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductWithImages>>> {
    Ok(Json(catalog::list_products(&state.db, &filter).await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<ProductWithImages>> {
    Ok(Json(catalog::get_product(&state.db, product_id).await?))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(catalog::list_categories(&state.db).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/categories", get(list_categories))
}
