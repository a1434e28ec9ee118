//! Catalog business logic - Handles product browsing and back-office product management.
//!
//! Browsing always hides soft-deleted products. Products are returned together with
//! their images so listing and detail views need a single call. Back-office functions
//! validate input the same way on create and update.

use crate::{
    config::store::SeedProduct,
    entities::{Product, ProductImage, product, product_image},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Sort orders offered by the listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    Rating,
    Newest,
}

/// Listing filters; every field is optional
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductFilter {
    /// Exact category match
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Case-insensitive substring over name and description
    pub search: Option<String>,
    /// When true, only in-stock products
    pub in_stock: Option<bool>,
    pub sort: Option<SortOrder>,
}

/// A product with its images, ordered by position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: product::Model,
    pub images: Vec<product_image::Model>,
}

/// Fields accepted when creating a product
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub rating: f64,
}

/// Partial update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub rating: Option<f64>,
}

const fn default_true() -> bool {
    true
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "Product name cannot be empty"));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::validation("category", "Category cannot be empty"));
    }
    Ok(())
}

/// Highest accepted unit price
pub const MAX_PRICE: f64 = 1_000_000.0;

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || !(0.0..=MAX_PRICE).contains(&price) {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

fn validate_rating(rating: f64) -> Result<()> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(Error::validation("rating", "Rating must be between 0 and 5"));
    }
    Ok(())
}

async fn attach_images(
    db: &DatabaseConnection,
    products: Vec<product::Model>,
) -> Result<Vec<ProductWithImages>> {
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let mut images: HashMap<i64, Vec<product_image::Model>> = HashMap::new();
    if !ids.is_empty() {
        for image in ProductImage::find()
            .filter(product_image::Column::ProductId.is_in(ids))
            .order_by_asc(product_image::Column::Position)
            .order_by_asc(product_image::Column::Id)
            .all(db)
            .await?
        {
            images.entry(image.product_id).or_default().push(image);
        }
    }

    Ok(products
        .into_iter()
        .map(|product| ProductWithImages {
            images: images.remove(&product.id).unwrap_or_default(),
            product,
        })
        .collect())
}

/// Literal, Unicode case-insensitive substring match over name and description.
/// `needle` must already be lowercased.
fn matches_search(product: &product::Model, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Lists active products matching `filter`, each with its images.
///
/// Without an explicit sort, products are ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
#[instrument(skip(db))]
pub async fn list_products(
    db: &DatabaseConnection,
    filter: &ProductFilter,
) -> Result<Vec<ProductWithImages>> {
    let mut query = Product::find().filter(product::Column::IsDeleted.eq(false));

    if let Some(category) = filter.category.as_deref().filter(|c| !c.trim().is_empty()) {
        query = query.filter(product::Column::Category.eq(category.trim()));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(product::Column::Price.lte(max));
    }
    if filter.in_stock == Some(true) {
        query = query.filter(product::Column::InStock.eq(true));
    }

    query = match filter.sort {
        Some(SortOrder::PriceAsc) => query.order_by_asc(product::Column::Price),
        Some(SortOrder::PriceDesc) => query.order_by_desc(product::Column::Price),
        Some(SortOrder::Rating) => query.order_by_desc(product::Column::Rating),
        Some(SortOrder::Newest) => query.order_by_desc(product::Column::CreatedAt),
        None => query.order_by_asc(product::Column::Name),
    };

    let mut products = query.order_by_asc(product::Column::Id).all(db).await?;
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        products.retain(|p| matches_search(p, &needle));
    }
    debug!("Fetched {} products.", products.len());
    attach_images(db, products).await
}

/// Retrieves one active product with its images.
///
/// # Errors
/// Returns `Error::ProductNotFound` if the product does not exist or is deleted.
pub async fn get_product(db: &DatabaseConnection, product_id: i64) -> Result<ProductWithImages> {
    let product = get_active_product(db, product_id).await?;
    let mut with_images = attach_images(db, vec![product]).await?;
    with_images
        .pop()
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Retrieves an active product row, without images.
///
/// # Errors
/// Returns `Error::ProductNotFound` if the product does not exist or is deleted.
pub async fn get_active_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Distinct categories of active products, sorted alphabetically.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<String>> {
    Product::find()
        .select_only()
        .column(product::Column::Category)
        .distinct()
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Category)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product after validating its fields.
///
/// # Errors
/// Returns an error if:
/// - The name or category is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The rating is outside 0..=5
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_product(db: &DatabaseConnection, new: NewProduct) -> Result<product::Model> {
    validate_name(&new.name)?;
    validate_category(&new.category)?;
    validate_price(new.price)?;
    validate_rating(new.rating)?;

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        name: Set(new.name.trim().to_string()),
        description: Set(new.description.filter(|d| !d.trim().is_empty())),
        price: Set(new.price),
        category: Set(new.category.trim().to_string()),
        in_stock: Set(new.in_stock),
        rating: Set(new.rating),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    info!("Created product '{}' (ID: {})", product.name, product.id);
    Ok(product)
}

/// Applies a partial update to an active product.
///
/// # Errors
/// Returns an error if a provided field fails validation, the product does not
/// exist or is deleted, or the database update fails.
#[instrument(skip(db))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: ProductUpdate,
) -> Result<product::Model> {
    if let Some(name) = changes.name.as_deref() {
        validate_name(name)?;
    }
    if let Some(category) = changes.category.as_deref() {
        validate_category(category)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }
    if let Some(rating) = changes.rating {
        validate_rating(rating)?;
    }

    let mut product: product::ActiveModel = get_active_product(db, product_id).await?.into();

    if let Some(name) = changes.name {
        product.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        product.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
    }
    if let Some(price) = changes.price {
        product.price = Set(price);
    }
    if let Some(category) = changes.category {
        product.category = Set(category.trim().to_string());
    }
    if let Some(in_stock) = changes.in_stock {
        product.in_stock = Set(in_stock);
    }
    if let Some(rating) = changes.rating {
        product.rating = Set(rating);
    }
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Soft deletes a product, preserving order history.
///
/// # Errors
/// Returns `Error::ProductNotFound` if the product does not exist or is already deleted.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = get_active_product(db, product_id).await?.into();
    product.is_deleted = Set(true);
    product.updated_at = Set(chrono::Utc::now());
    let product = product.update(db).await?;
    info!("Soft deleted product {}", product_id);
    Ok(product)
}

/// Appends an image to a product. Without a position, the image goes last.
///
/// # Errors
/// Returns an error if the URL is blank, the product does not exist, or the insert fails.
pub async fn add_product_image(
    db: &DatabaseConnection,
    product_id: i64,
    url: &str,
    position: Option<i32>,
) -> Result<product_image::Model> {
    if url.trim().is_empty() {
        return Err(Error::validation("url", "Image URL cannot be empty"));
    }
    get_active_product(db, product_id).await?;

    let position = match position {
        Some(p) => p,
        None => {
            let last = ProductImage::find()
                .filter(product_image::Column::ProductId.eq(product_id))
                .order_by_desc(product_image::Column::Position)
                .one(db)
                .await?;
            last.map_or(0, |image| image.position + 1)
        }
    };

    product_image::ActiveModel {
        product_id: Set(product_id),
        url: Set(url.trim().to_string()),
        position: Set(position),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Removes one image from a product.
///
/// # Errors
/// Returns `Error::ImageNotFound` if the image does not belong to the product.
pub async fn remove_product_image(
    db: &DatabaseConnection,
    product_id: i64,
    image_id: i64,
) -> Result<()> {
    let image = ProductImage::find_by_id(image_id)
        .one(db)
        .await?
        .filter(|image| image.product_id == product_id)
        .ok_or(Error::ImageNotFound { id: image_id })?;
    image.delete(db).await?;
    Ok(())
}

/// Inserts the configured starter catalog when no product exists yet.
///
/// Returns the number of products inserted.
///
/// # Errors
/// Returns an error if a seed entry fails validation or an insert fails.
pub async fn seed_catalog(db: &DatabaseConnection, seeds: &[SeedProduct]) -> Result<usize> {
    if seeds.is_empty() || Product::find().one(db).await?.is_some() {
        return Ok(0);
    }

    for seed in seeds {
        let product = create_product(
            db,
            NewProduct {
                name: seed.name.clone(),
                description: seed.description.clone(),
                price: seed.price,
                category: seed.category.clone(),
                in_stock: seed.in_stock,
                rating: seed.rating,
            },
        )
        .await?;
        for url in &seed.images {
            add_product_image(db, product.id, url, None).await?;
        }
    }
    info!("Seeded {} catalog products.", seeds.len());
    Ok(seeds.len())
}
