//! Back office endpoints, mounted under `/admin`. Every handler requires [`AdminUser`].

use super::{AppState, auth::AdminUser};
use crate::{
    core::{
        catalog::{self, NewProduct, ProductFilter, ProductUpdate, ProductWithImages},
        order::{self, OrderWithItems},
        profile::{self, CustomerSummary},
        promotion::{self, NewPromotion, PromotionUpdate},
        report::{self, SalesReport},
    },
    entities::{
        OrderStatus, order::Model as OrderModel, product, product_image,
        profile::Model as ProfileModel, promotion::Model as PromotionModel,
    },
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct NewImage {
    pub url: String,
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct Activation {
    pub is_active: bool,
}

// Products

async fn list_products(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductWithImages>>> {
    Ok(Json(catalog::list_products(&state.db, &filter).await?))
}

async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<product::Model>)> {
    let product = catalog::create_product(&state.db, new).await?;
    info!("Admin {} created product {}", admin.id, product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<i64>,
    Json(changes): Json<ProductUpdate>,
) -> Result<Json<product::Model>> {
    Ok(Json(
        catalog::update_product(&state.db, product_id, changes).await?,
    ))
}

async fn delete_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(product_id): Path<i64>,
) -> Result<StatusCode> {
    catalog::delete_product(&state.db, product_id).await?;
    info!("Admin {} deleted product {}", admin.id, product_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn add_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<i64>,
    Json(image): Json<NewImage>,
) -> Result<(StatusCode, Json<product_image::Model>)> {
    let image =
        catalog::add_product_image(&state.db, product_id, &image.url, image.position).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

async fn remove_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    catalog::remove_product_image(&state.db, product_id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Orders

async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<OrderModel>>> {
    Ok(Json(order::list_orders(&state.db, query.status).await?))
}

async fn show_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderWithItems>> {
    Ok(Json(order::get_order_with_items(&state.db, order_id).await?))
}

async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(order_id): Path<i64>,
    Json(change): Json<StatusChange>,
) -> Result<Json<OrderModel>> {
    Ok(Json(
        order::update_order_status(&state.db, order_id, change.status).await?,
    ))
}

// Customers

async fn list_customers(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ProfileModel>>> {
    Ok(Json(profile::list_customers(&state.db).await?))
}

async fn show_customer(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(profile_id): Path<i64>,
) -> Result<Json<CustomerSummary>> {
    Ok(Json(profile::customer_summary(&state.db, profile_id).await?))
}

// Promotions

async fn list_promotions(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PromotionModel>>> {
    Ok(Json(promotion::list_promotions(&state.db).await?))
}

async fn create_promotion(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(new): Json<NewPromotion>,
) -> Result<(StatusCode, Json<PromotionModel>)> {
    let promotion = promotion::create_promotion(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

async fn update_promotion(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(promotion_id): Path<i64>,
    Json(changes): Json<PromotionUpdate>,
) -> Result<Json<PromotionModel>> {
    Ok(Json(
        promotion::update_promotion(&state.db, promotion_id, changes).await?,
    ))
}

async fn delete_promotion(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(promotion_id): Path<i64>,
) -> Result<StatusCode> {
    promotion::delete_promotion(&state.db, promotion_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_activation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(promotion_id): Path<i64>,
    Json(body): Json<Activation>,
) -> Result<Json<PromotionModel>> {
    Ok(Json(
        promotion::set_active(&state.db, promotion_id, body.is_active).await?,
    ))
}

// Dashboard

async fn sales_report(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<SalesReport>> {
    Ok(Json(report::sales_report(&state.db).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/products/:id/images", post(add_image))
        .route("/products/:id/images/:image_id", delete(remove_image))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(show_order))
        .route("/orders/:id/status", put(update_order_status))
        .route("/customers", get(list_customers))
        .route("/customers/:id", get(show_customer))
        .route("/promotions", get(list_promotions).post(create_promotion))
        .route("/promotions/:id", put(update_promotion).delete(delete_promotion))
        .route("/promotions/:id/activation", put(set_activation))
        .route("/report", get(sales_report))
}
