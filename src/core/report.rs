//! Sales report for the back office dashboard.
//!
//! Revenue figures only count paid orders. Amounts are summed in cents and
//! converted once at the end.

use crate::{
    core::pricing::{from_cents, to_cents},
    entities::{Order, OrderStatus, PaymentStatus, Product, Profile, Role, product, profile},
    errors::Result,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

/// Number of orders in one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// Store-wide sales figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    /// Sum of totals over paid orders
    pub revenue: f64,
    /// Number of paid orders
    pub paid_orders: u64,
    /// `revenue / paid_orders`, zero when nothing has been sold
    pub average_order_value: f64,
    /// Order count for every status, including empty ones
    pub orders_by_status: Vec<StatusCount>,
    /// Products that are not deleted
    pub active_products: u64,
    /// Registered customer accounts
    pub customers: u64,
}

/// Average of `total_cents` over `count`, rounded to the nearest cent.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn average_cents(total_cents: i64, count: u64) -> i64 {
    if count == 0 {
        return 0;
    }
    (total_cents as f64 / count as f64).round() as i64
}

/// Builds the sales report.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn sales_report(db: &DatabaseConnection) -> Result<SalesReport> {
    let orders = Order::find().all(db).await?;

    let paid: Vec<_> = orders
        .iter()
        .filter(|o| o.payment_status == PaymentStatus::Paid)
        .collect();
    let revenue_cents: i64 = paid.iter().map(|o| to_cents(o.total)).sum();
    let paid_orders = u64::try_from(paid.len())?;

    let mut orders_by_status = Vec::new();
    for status in [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
    ] {
        let count = orders.iter().filter(|o| o.status == status).count();
        orders_by_status.push(StatusCount {
            status,
            count: u64::try_from(count)?,
        });
    }

    let active_products = Product::find()
        .filter(product::Column::IsDeleted.eq(false))
        .count(db)
        .await?;
    let customers = Profile::find()
        .filter(profile::Column::Role.eq(Role::Customer))
        .count(db)
        .await?;

    Ok(SalesReport {
        revenue: from_cents(revenue_cents),
        paid_orders,
        average_order_value: from_cents(average_cents(revenue_cents, paid_orders)),
        orders_by_status,
        active_products,
        customers,
    })
}
