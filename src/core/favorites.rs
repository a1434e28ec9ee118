//! Favorites business logic - Products a shopper marked to look at later.
//!
//! Like the cart, favorites live on the device for guests and are merged into
//! the stored list on login via [`sync_favorites`].

use crate::{
    core::catalog,
    entities::{Favorite, Product, favorite, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use tracing::{instrument, warn};

async fn find_favorite(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
) -> Result<Option<favorite::Model>> {
    Favorite::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::ProductId.eq(product_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts a favorite; an existing one for the same (user, product) is kept as is.
async fn insert_favorite(db: &DatabaseConnection, user_id: i64, product_id: i64) -> Result<()> {
    let favorite = favorite::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    Favorite::insert(favorite)
        .on_conflict(
            OnConflict::columns([favorite::Column::UserId, favorite::Column::ProductId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Lists the user's favorite products, most recently added first.
///
/// Deleted products are left out.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_favorites(db: &DatabaseConnection, user_id: i64) -> Result<Vec<product::Model>> {
    let rows = Favorite::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .order_by_desc(favorite::Column::CreatedAt)
        .order_by_desc(favorite::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(_, product)| product.filter(|p| !p.is_deleted))
        .collect())
}

/// Whether the user has favorited the product.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn is_favorite(db: &DatabaseConnection, user_id: i64, product_id: i64) -> Result<bool> {
    Ok(find_favorite(db, user_id, product_id).await?.is_some())
}

/// Flips the favorite state of a product and returns the new state.
///
/// # Errors
/// Returns `Error::ProductNotFound` when adding a product that does not exist or
/// is deleted. Removing is always allowed.
#[instrument(skip(db))]
pub async fn toggle_favorite(db: &DatabaseConnection, user_id: i64, product_id: i64) -> Result<bool> {
    if let Some(existing) = find_favorite(db, user_id, product_id).await? {
        existing.delete(db).await?;
        return Ok(false);
    }

    catalog::get_active_product(db, product_id).await?;
    insert_favorite(db, user_id, product_id).await?;
    Ok(true)
}

/// Removes a product from the user's favorites. Absent favorites are ignored.
///
/// # Errors
/// Returns an error if the database delete fails.
pub async fn remove_favorite(db: &DatabaseConnection, user_id: i64, product_id: i64) -> Result<()> {
    Favorite::delete_many()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Merges device-local favorites into the stored list (set union) and returns the result.
///
/// Unknown or deleted products in the local list are skipped.
///
/// # Errors
/// Returns an error if a database query or write fails.
#[instrument(skip(db, local_product_ids), fields(local = local_product_ids.len()))]
pub async fn sync_favorites(
    db: &DatabaseConnection,
    user_id: i64,
    local_product_ids: &[i64],
) -> Result<Vec<product::Model>> {
    for &product_id in local_product_ids {
        if find_favorite(db, user_id, product_id).await?.is_some() {
            continue;
        }
        match catalog::get_active_product(db, product_id).await {
            Ok(_) => insert_favorite(db, user_id, product_id).await?,
            Err(Error::ProductNotFound { .. }) => {
                warn!("Skipping local favorite for unknown product {}", product_id);
            }
            Err(e) => return Err(e),
        }
    }
    list_favorites(db, user_id).await
}
