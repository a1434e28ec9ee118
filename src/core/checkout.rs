//! Checkout business logic - Delivery details, the payment session, and reconciliation.
//!
//! Checkout is a three step wizard:
//! 1. The shopper enters delivery details ([`validate_delivery`]).
//! 2. [`begin_checkout`] prices the cart and opens a hosted payment session.
//!    The priced lines and delivery details are stored with the session.
//! 3. After the payment page redirects back, [`reconcile_payment`] asks the
//!    processor whether the session was paid and, if so, writes the order.
//!
//! Reconciliation may run more than once for the same session (page reloads,
//! retries). Only the first successful run writes an order; later runs return it.

use crate::{
    config::store::{DeliveryPolicy, StoreConfig},
    core::{
        cart,
        order::{OrderWithItems, get_order_with_items},
        pricing::{self, OrderQuote, QuoteLine, from_cents, to_cents},
        promotion,
    },
    entities::{
        CheckoutSession, CheckoutStatus, OrderStatus, PaymentStatus, checkout_session, order,
        order_item,
    },
    errors::{Error, Result},
    payment::{PaymentGateway, SessionLineItem, SessionRequest},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

const DELIVERY_LINE_NAME: &str = "Delivery";
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Step 1 of the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// Result of step 2: where to send the shopper, and what they will pay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutStart {
    pub session_id: String,
    pub payment_url: String,
    pub quote: OrderQuote,
}

fn require(field: &str, value: &str, label: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, format!("{label} is required")));
    }
    Ok(())
}

fn phone_digit_count(phone: &str) -> Option<usize> {
    let mut digits = 0;
    for c in phone.trim().chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '+' | '-' | '(' | ')' => {}
            _ => return None,
        }
    }
    Some(digits)
}

/// Checks the delivery form, reporting the first field that fails.
///
/// # Errors
/// Returns `Error::Validation` naming the offending field.
pub fn validate_delivery(info: &DeliveryInfo) -> Result<()> {
    require("full_name", &info.full_name, "Full name")?;

    let email = info.email.trim();
    let email_ok = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'));
    if !email_ok {
        return Err(Error::validation("email", "Enter a valid email address"));
    }

    match phone_digit_count(&info.phone) {
        Some(n) if (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&n) => {}
        _ => {
            return Err(Error::validation(
                "phone",
                format!("Phone number must have {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits"),
            ));
        }
    }

    require("address", &info.address, "Address")?;
    require("city", &info.city, "City")?;
    require("postal_code", &info.postal_code, "Postal code")?;
    Ok(())
}

/// Prices the user's cart, optionally with a promotion code.
///
/// A blank code is treated as no code.
///
/// # Errors
/// Returns an error if:
/// - The cart is empty
/// - A product in the cart is out of stock
/// - The promotion code is unknown, switched off or outside its window
pub async fn quote_cart(
    db: &DatabaseConnection,
    user_id: i64,
    promotion_code: Option<&str>,
    policy: &DeliveryPolicy,
) -> Result<OrderQuote> {
    let lines = cart::get_cart(db, user_id).await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }
    if let Some(line) = lines.iter().find(|l| !l.product.in_stock) {
        return Err(Error::OutOfStock { id: line.product.id });
    }

    let applied = match promotion_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Some(promotion::find_applicable(db, code, chrono::Utc::now()).await?),
        None => None,
    };

    let items: Vec<_> = lines.into_iter().map(|l| (l.product, l.quantity)).collect();
    pricing::quote(&items, applied.as_ref(), policy)
}

fn session_request(
    store: &StoreConfig,
    user_id: i64,
    delivery: &DeliveryInfo,
    quote: &OrderQuote,
) -> SessionRequest {
    let mut line_items: Vec<SessionLineItem> = quote
        .lines
        .iter()
        .map(|line| SessionLineItem {
            name: line.product_name.clone(),
            unit_amount_cents: line.discounted_unit_cents,
            quantity: line.quantity,
        })
        .collect();
    if quote.delivery_fee_cents > 0 {
        line_items.push(SessionLineItem {
            name: DELIVERY_LINE_NAME.to_string(),
            unit_amount_cents: quote.delivery_fee_cents,
            quantity: 1,
        });
    }

    SessionRequest {
        line_items,
        currency: store.currency.clone(),
        success_url: store.checkout.success_url.clone(),
        cancel_url: store.checkout.cancel_url.clone(),
        customer_email: delivery.email.trim().to_string(),
        client_reference_id: user_id.to_string(),
    }
}

/// Step 2: prices the cart and opens a hosted payment session.
///
/// # Errors
/// Returns an error if delivery details are invalid, the cart cannot be
/// quoted, the processor call fails, or the session cannot be stored.
#[instrument(skip(db, gateway, store, delivery))]
pub async fn begin_checkout(
    db: &DatabaseConnection,
    gateway: &dyn PaymentGateway,
    store: &StoreConfig,
    user_id: i64,
    delivery: DeliveryInfo,
    promotion_code: Option<&str>,
) -> Result<CheckoutStart> {
    validate_delivery(&delivery)?;
    let quote = quote_cart(db, user_id, promotion_code, &store.delivery).await?;

    let request = session_request(store, user_id, &delivery, &quote);
    let session = gateway.create_session(&request).await?;
    let payment_url = session.url.clone().ok_or_else(|| Error::Payment {
        message: format!("Session {} has no payment page", session.id),
    })?;

    let now = chrono::Utc::now();
    checkout_session::ActiveModel {
        session_id: Set(session.id.clone()),
        user_id: Set(user_id),
        status: Set(CheckoutStatus::Open),
        delivery_json: Set(serde_json::to_string(&delivery)?),
        lines_json: Set(serde_json::to_string(&quote.lines)?),
        promotion_code: Set(quote.promotion_code.clone()),
        subtotal: Set(from_cents(quote.subtotal_cents)),
        discount: Set(from_cents(quote.discount_cents)),
        delivery_fee: Set(from_cents(quote.delivery_fee_cents)),
        total: Set(from_cents(quote.total_cents)),
        order_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Opened checkout session {} for user {} ({} cents)",
        session.id, user_id, quote.total_cents
    );
    Ok(CheckoutStart {
        session_id: session.id,
        payment_url,
        quote,
    })
}

async fn find_session<C>(db: &C, user_id: i64, session_id: &str) -> Result<checkout_session::Model>
where
    C: ConnectionTrait,
{
    CheckoutSession::find()
        .filter(checkout_session::Column::SessionId.eq(session_id))
        .filter(checkout_session::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::CheckoutSessionNotFound {
            session_id: session_id.to_string(),
        })
}

/// Step 3: confirms payment with the processor and writes the order.
///
/// In one transaction: the order and its lines are inserted, the cart is
/// emptied, and the checkout session is marked completed.
///
/// # Errors
/// Returns an error if:
/// - The session does not exist or belongs to another user
/// - The processor reports the session unpaid (`Error::PaymentNotCompleted`)
/// - The processor reports a different amount than was quoted (`Error::Payment`)
/// - A database operation fails
#[instrument(skip(db, gateway))]
pub async fn reconcile_payment(
    db: &DatabaseConnection,
    gateway: &dyn PaymentGateway,
    user_id: i64,
    session_id: &str,
) -> Result<OrderWithItems> {
    let session = find_session(db, user_id, session_id).await?;
    if let Some(order_id) = session.order_id {
        return get_order_with_items(db, order_id).await;
    }

    let remote = gateway.retrieve_session(session_id).await?;
    if !remote.paid {
        return Err(Error::PaymentNotCompleted {
            session_id: session_id.to_string(),
        });
    }
    let expected = to_cents(session.total);
    if let Some(charged) = remote.amount_total_cents.filter(|&c| c != expected) {
        warn!(
            "Session {} charged {} cents, expected {}",
            session_id, charged, expected
        );
        return Err(Error::Payment {
            message: format!("Charged {charged} cents but the order totals {expected} cents"),
        });
    }

    let delivery: DeliveryInfo = serde_json::from_str(&session.delivery_json)?;
    let lines: Vec<QuoteLine> = serde_json::from_str(&session.lines_json)?;

    let txn = db.begin().await?;

    // Another request may have finished reconciling while we asked the processor
    let session = find_session(&txn, user_id, session_id).await?;
    if let Some(order_id) = session.order_id {
        txn.commit().await?;
        return get_order_with_items(db, order_id).await;
    }

    let now = chrono::Utc::now();
    let order = order::ActiveModel {
        user_id: Set(user_id),
        status: Set(OrderStatus::Processing),
        payment_status: Set(PaymentStatus::Paid),
        payment_session_id: Set(session.session_id.clone()),
        shipping_name: Set(delivery.full_name.trim().to_string()),
        shipping_email: Set(delivery.email.trim().to_string()),
        shipping_phone: Set(delivery.phone.trim().to_string()),
        shipping_address: Set(delivery.address.trim().to_string()),
        shipping_city: Set(delivery.city.trim().to_string()),
        shipping_postal_code: Set(delivery.postal_code.trim().to_string()),
        promotion_code: Set(session.promotion_code.clone()),
        subtotal: Set(session.subtotal),
        discount: Set(session.discount),
        delivery_fee: Set(session.delivery_fee),
        total: Set(session.total),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for line in &lines {
        order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            product_name: Set(line.product_name.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(from_cents(line.discounted_unit_cents)),
            total_price: Set(from_cents(line.line_total_cents)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    cart::clear_cart(&txn, user_id).await?;

    let mut session: checkout_session::ActiveModel = session.into();
    session.status = Set(CheckoutStatus::Completed);
    session.order_id = Set(Some(order.id));
    session.updated_at = Set(now);
    session.update(&txn).await?;

    txn.commit().await?;
    info!("Reconciled session {} into order {}", session_id, order.id);
    get_order_with_items(db, order.id).await
}
