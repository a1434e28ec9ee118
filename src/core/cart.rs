//! Cart business logic - The remote copy of a signed-in shopper's cart.
//!
//! Guests keep their cart on the device. On login the client sends that local
//! cart to [`sync_cart`], which merges it into the stored one; afterwards every
//! change goes through the functions below. Each (user, product) pair has at
//! most one line and every line holds between 1 and `max_quantity` units.

use crate::{
    core::catalog,
    core::pricing::{from_cents, to_cents},
    entities::{CartItem, Product, cart_item, product},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Set,
    prelude::*,
    sea_query::{Func, OnConflict},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// One cart line joined with its product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product: product::Model,
    pub quantity: i32,
    pub line_total: f64,
}

/// A cart line as held in device storage before login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalCartItem {
    pub product_id: i64,
    pub quantity: i32,
}

fn check_quantity(quantity: i32, max_quantity: i32) -> Result<()> {
    if quantity < 1 || quantity > max_quantity {
        return Err(Error::InvalidQuantity {
            quantity,
            max: max_quantity,
        });
    }
    Ok(())
}

async fn find_line<C>(db: &C, user_id: i64, product_id: i64) -> Result<Option<cart_item::Model>>
where
    C: ConnectionTrait,
{
    CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts a line, resolving a clash on (user, product) with `on_conflict`.
async fn upsert_line(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
    on_conflict: OnConflict,
) -> Result<()> {
    let line = cart_item::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        added_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    CartItem::insert(line)
        .on_conflict(on_conflict)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn purchasable_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let product = catalog::get_active_product(db, product_id).await?;
    if !product.in_stock {
        return Err(Error::OutOfStock { id: product_id });
    }
    Ok(product)
}

/// Returns the user's cart in the order products were added.
///
/// Lines whose product has since been deleted from the catalog are skipped.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_cart(db: &DatabaseConnection, user_id: i64) -> Result<Vec<CartLine>> {
    let rows = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .order_by_asc(cart_item::Column::AddedAt)
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(line, product)| {
            let product = product.filter(|p| !p.is_deleted)?;
            let line_total =
                from_cents(to_cents(product.price).saturating_mul(i64::from(line.quantity)));
            Some(CartLine {
                product,
                quantity: line.quantity,
                line_total,
            })
        })
        .collect())
}

/// Adds units of a product to the cart, creating the line if needed.
///
/// The resulting quantity is capped at `max_quantity`, both for a new line and
/// when units are added to an existing one.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is less than 1
/// - The product does not exist, is deleted, or is out of stock
/// - The database write fails
#[instrument(skip(db))]
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
    max_quantity: i32,
) -> Result<cart_item::Model> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity {
            quantity,
            max: max_quantity,
        });
    }
    purchasable_product(db, product_id).await?;

    let quantity = quantity.min(max_quantity);
    let merge = OnConflict::columns([cart_item::Column::UserId, cart_item::Column::ProductId])
        .value(
            cart_item::Column::Quantity,
            Func::least([
                Expr::col(cart_item::Column::Quantity).add(quantity),
                Expr::val(max_quantity).into(),
            ]),
        )
        .to_owned();
    upsert_line(db, user_id, product_id, quantity, merge).await?;

    let line = find_line(db, user_id, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    info!(
        "User {} cart line for product {} now holds {}",
        user_id, product_id, line.quantity
    );
    Ok(line)
}

/// Sets the quantity of an existing cart line. A quantity of 0 removes the line.
///
/// Returns the updated line, or `None` when it was removed.
///
/// # Errors
/// Returns `Error::InvalidQuantity` for quantities outside `0..=max_quantity` and
/// `Error::ProductNotFound` when the product is not in the cart.
#[instrument(skip(db))]
pub async fn update_quantity(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
    max_quantity: i32,
) -> Result<Option<cart_item::Model>> {
    if quantity == 0 {
        remove_from_cart(db, user_id, product_id).await?;
        return Ok(None);
    }
    check_quantity(quantity, max_quantity)?;

    let existing = find_line(db, user_id, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    let mut line: cart_item::ActiveModel = existing.into();
    line.quantity = Set(quantity);
    Ok(Some(line.update(db).await?))
}

/// Removes a product from the cart. Removing an absent product is not an error.
///
/// # Errors
/// Returns an error if the database delete fails.
pub async fn remove_from_cart(db: &DatabaseConnection, user_id: i64, product_id: i64) -> Result<()> {
    CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Empties the user's cart, returning the number of lines removed.
///
/// Takes any connection so reconciliation can clear the cart inside its transaction.
///
/// # Errors
/// Returns an error if the database delete fails.
pub async fn clear_cart<C>(db: &C, user_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Merges a device-local cart into the stored cart and returns the merged cart.
///
/// For a product present on both sides the larger quantity wins, so sending the
/// same local cart twice changes nothing. Local lines for unknown, deleted or
/// out-of-stock products are skipped; quantities are clamped to `1..=max_quantity`.
///
/// # Errors
/// Returns an error if a database query or write fails.
#[instrument(skip(db, local_items), fields(local_lines = local_items.len()))]
pub async fn sync_cart(
    db: &DatabaseConnection,
    user_id: i64,
    local_items: &[LocalCartItem],
    max_quantity: i32,
) -> Result<Vec<CartLine>> {
    for item in local_items {
        if item.quantity < 1 {
            continue;
        }
        match purchasable_product(db, item.product_id).await {
            Ok(_) => {}
            Err(Error::ProductNotFound { .. } | Error::OutOfStock { .. }) => {
                warn!(
                    "Skipping local cart line for unavailable product {}",
                    item.product_id
                );
                continue;
            }
            Err(e) => return Err(e),
        }

        let quantity = item.quantity.min(max_quantity);
        let keep_larger =
            OnConflict::columns([cart_item::Column::UserId, cart_item::Column::ProductId])
                .value(
                    cart_item::Column::Quantity,
                    Func::greatest([
                        Expr::col(cart_item::Column::Quantity).into(),
                        Expr::val(quantity).into(),
                    ]),
                )
                .to_owned();
        upsert_line(db, user_id, item.product_id, quantity, keep_larger).await?;
    }

    get_cart(db, user_id).await
}
