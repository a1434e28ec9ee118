//! Order business logic - Order history for shoppers and fulfilment for the back office.
//!
//! Orders are only created by payment reconciliation (see `core::checkout`).
//! Afterwards the back office moves them forward through their statuses.

use crate::{
    entities::{Order, OrderItem, OrderStatus, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// An order with its lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Loads an order and its lines.
///
/// # Errors
/// Returns `Error::OrderNotFound` if the order does not exist.
pub async fn get_order_with_items<C>(db: &C, order_id: i64) -> Result<OrderWithItems>
where
    C: ConnectionTrait,
{
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;
    Ok(OrderWithItems { order, items })
}

/// Lists a shopper's orders, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_orders_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads one of the shopper's own orders.
///
/// Orders belonging to someone else are reported as not found.
///
/// # Errors
/// Returns `Error::OrderNotFound` if the order does not exist or belongs to another user.
pub async fn get_order_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<OrderWithItems> {
    let found = get_order_with_items(db, order_id).await?;
    if found.order.user_id != user_id {
        return Err(Error::OrderNotFound { id: order_id });
    }
    Ok(found)
}

/// Lists all orders for the back office, newest first, optionally by status.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_orders(
    db: &DatabaseConnection,
    status: Option<OrderStatus>,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find();
    if let Some(status) = status {
        query = query.filter(order::Column::Status.eq(status));
    }
    query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order to a new fulfilment status.
///
/// Setting the current status again leaves the order untouched.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist
/// - The move would go backwards
/// - The database update fails
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
) -> Result<order::Model> {
    let current = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if current.status == status {
        return Ok(current);
    }
    if !current.status.can_transition_to(status) {
        return Err(Error::InvalidStatusTransition {
            from: current.status.to_string(),
            to: status.to_string(),
        });
    }

    let from = current.status;
    let mut order: order::ActiveModel = current.into();
    order.status = Set(status);
    order.updated_at = Set(chrono::Utc::now());
    let order = order.update(db).await?;
    info!("Order {} moved from {} to {}", order.id, from, status);
    Ok(order)
}
