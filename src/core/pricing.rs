//! Order pricing - subtotal, promotion discount, and tiered delivery fee.
//!
//! Everything here works in integer cents so that the amounts sent to the
//! payment processor and the amounts written to the order always agree.
//! Prices are stored as `f64` in the database and converted at the edges with
//! [`to_cents`] and [`from_cents`].

use crate::{
    config::store::DeliveryPolicy,
    entities::product,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};

/// Converts a currency amount to whole cents, rounding half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Converts whole cents back to a currency amount.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// One priced cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    /// Catalog unit price
    pub unit_price_cents: i64,
    /// Unit price after the promotion discount
    pub discounted_unit_cents: i64,
    /// `discounted_unit_cents * quantity`
    pub line_total_cents: i64,
}

/// Priced order, ready to be shown on the payment step or sent to the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub lines: Vec<QuoteLine>,
    /// Promotion code that was applied, uppercased
    pub promotion_code: Option<String>,
    /// Sum of line totals after discount
    pub subtotal_cents: i64,
    /// Amount taken off by the promotion
    pub discount_cents: i64,
    pub delivery_fee_cents: i64,
    /// `subtotal_cents + delivery_fee_cents`
    pub total_cents: i64,
}

/// A promotion reduced to what pricing needs
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromotion {
    pub code: String,
    pub discount_percent: f64,
}

/// Delivery fee for a subtotal under the given policy.
///
/// Free at or above the threshold; otherwise the fee of the highest tier whose
/// `min_subtotal` does not exceed the subtotal. A subtotal below every tier pays
/// the lowest tier's fee.
#[must_use]
pub fn delivery_fee_cents(subtotal_cents: i64, policy: &DeliveryPolicy) -> i64 {
    if subtotal_cents >= to_cents(policy.free_threshold) {
        return 0;
    }

    let matching = policy
        .tiers
        .iter()
        .filter(|tier| to_cents(tier.min_subtotal) <= subtotal_cents)
        .max_by_key(|tier| to_cents(tier.min_subtotal));

    matching
        .or_else(|| policy.tiers.iter().min_by_key(|tier| to_cents(tier.min_subtotal)))
        .map_or(0, |tier| to_cents(tier.fee))
}

/// Unit price after a percentage discount.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn discounted_unit_cents(unit_cents: i64, discount_percent: f64) -> i64 {
    let off = (unit_cents as f64 * discount_percent / 100.0).round() as i64;
    (unit_cents - off).max(0)
}

/// Prices a list of `(product, quantity)` pairs.
///
/// # Errors
/// Returns `Error::EmptyCart` when `items` is empty, `Error::InvalidQuantity`
/// when a quantity is not positive, and `Error::InvalidAmount` when an amount
/// does not fit in whole cents.
pub fn quote(
    items: &[(product::Model, i32)],
    promotion: Option<&AppliedPromotion>,
    policy: &DeliveryPolicy,
) -> Result<OrderQuote> {
    if items.is_empty() {
        return Err(Error::EmptyCart);
    }

    let percent = promotion.map_or(0.0, |p| p.discount_percent);
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal_cents: i64 = 0;
    let mut discount_cents: i64 = 0;

    for (product, quantity) in items {
        if *quantity < 1 {
            return Err(Error::InvalidQuantity {
                quantity: *quantity,
                max: i32::MAX,
            });
        }
        let unit = to_cents(product.price);
        let discounted = discounted_unit_cents(unit, percent);
        let qty = i64::from(*quantity);
        let too_large = || Error::InvalidAmount {
            amount: product.price,
        };
        let line_total = discounted.checked_mul(qty).ok_or_else(too_large)?;

        subtotal_cents = subtotal_cents
            .checked_add(line_total)
            .ok_or_else(too_large)?;
        discount_cents = (unit - discounted)
            .checked_mul(qty)
            .and_then(|off| discount_cents.checked_add(off))
            .ok_or_else(too_large)?;
        lines.push(QuoteLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: *quantity,
            unit_price_cents: unit,
            discounted_unit_cents: discounted,
            line_total_cents: line_total,
        });
    }

    let delivery = delivery_fee_cents(subtotal_cents, policy);
    let total_cents = subtotal_cents
        .checked_add(delivery)
        .ok_or(Error::InvalidAmount {
            amount: from_cents(subtotal_cents),
        })?;
    Ok(OrderQuote {
        lines,
        promotion_code: promotion.map(|p| p.code.clone()),
        subtotal_cents,
        discount_cents,
        delivery_fee_cents: delivery,
        total_cents,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::store::DeliveryTier;

    fn policy() -> DeliveryPolicy {
        DeliveryPolicy {
            free_threshold: 150.0,
            tiers: vec![
                DeliveryTier {
                    min_subtotal: 0.0,
                    fee: 15.0,
                },
                DeliveryTier {
                    min_subtotal: 75.0,
                    fee: 7.5,
                },
            ],
        }
    }

    fn product(id: i64, name: &str, price: f64) -> product::Model {
        let now = chrono::Utc::now();
        product::Model {
            id,
            name: name.to_string(),
            description: None,
            price,
            category: "lace-front".to_string(),
            in_stock: true,
            rating: 4.0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(19.99), 1999);
        assert_eq!(to_cents(0.1 + 0.2), 30);
        assert_eq!(from_cents(1999), 19.99);
    }

    #[test]
    fn test_delivery_fee_tiers() {
        let policy = policy();
        assert_eq!(delivery_fee_cents(5_000, &policy), 1_500);
        assert_eq!(delivery_fee_cents(7_499, &policy), 1_500);
        assert_eq!(delivery_fee_cents(7_500, &policy), 750);
        assert_eq!(delivery_fee_cents(14_999, &policy), 750);
        assert_eq!(delivery_fee_cents(15_000, &policy), 0);
        assert_eq!(delivery_fee_cents(90_000, &policy), 0);
    }

    #[test]
    fn test_delivery_fee_below_every_tier_uses_lowest() {
        let policy = DeliveryPolicy {
            free_threshold: 200.0,
            tiers: vec![DeliveryTier {
                min_subtotal: 20.0,
                fee: 9.0,
            }],
        };
        assert_eq!(delivery_fee_cents(1_000, &policy), 900);
    }

    #[test]
    fn test_quote_without_promotion() {
        let items = vec![
            (product(1, "Body Wave", 60.0), 1),
            (product(2, "Edge Brush", 4.5), 2),
        ];
        let quote = quote(&items, None, &policy()).unwrap();

        assert_eq!(quote.subtotal_cents, 6_900);
        assert_eq!(quote.discount_cents, 0);
        assert_eq!(quote.delivery_fee_cents, 1_500);
        assert_eq!(quote.total_cents, 8_400);
        assert_eq!(quote.lines[1].line_total_cents, 900);
        assert!(quote.promotion_code.is_none());
    }

    #[test]
    fn test_quote_with_promotion_uses_discounted_subtotal_for_delivery() {
        let items = vec![(product(1, "Deep Wave", 160.0), 1)];
        let promo = AppliedPromotion {
            code: "SPRING20".to_string(),
            discount_percent: 20.0,
        };
        let quote = quote(&items, Some(&promo), &policy()).unwrap();

        // 160 - 20% = 128, below the free threshold, in the 75+ tier
        assert_eq!(quote.lines[0].discounted_unit_cents, 12_800);
        assert_eq!(quote.subtotal_cents, 12_800);
        assert_eq!(quote.discount_cents, 3_200);
        assert_eq!(quote.delivery_fee_cents, 750);
        assert_eq!(quote.total_cents, 13_550);
        assert_eq!(quote.promotion_code.as_deref(), Some("SPRING20"));
    }

    #[test]
    fn test_quote_rejects_empty_cart() {
        let result = quote(&[], None, &policy());
        assert!(matches!(result, Err(Error::EmptyCart)));
    }

    #[test]
    fn test_quote_rejects_amounts_that_overflow() {
        let items = vec![(product(1, "Gold Unit", 1e17), 2)];
        let result = quote(&items, None, &policy());
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let items = vec![
            (product(1, "Gold Unit", 5e16), 1),
            (product(2, "Gold Unit", 5e16), 1),
        ];
        let result = quote(&items, None, &policy());
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_full_discount_never_goes_negative() {
        assert_eq!(discounted_unit_cents(999, 100.0), 0);
        assert_eq!(discounted_unit_cents(999, 10.0), 899);
    }
}
