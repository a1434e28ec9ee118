//! Payment processor integration.
//!
//! Checkout talks to the processor only through [`PaymentGateway`]: it opens a
//! hosted payment session and later asks whether that session was paid. The
//! production implementation is [`StripeGateway`]; [`FakeGateway`] keeps
//! sessions in memory for tests and local runs.

pub mod fake;
pub mod stripe;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use fake::FakeGateway;
pub use stripe::StripeGateway;

/// One line shown on the hosted payment page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    /// Price of one unit in the smallest currency unit
    pub unit_amount_cents: i64,
    pub quantity: i32,
}

/// Everything needed to open a hosted payment session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub line_items: Vec<SessionLineItem>,
    /// ISO currency code, lowercase
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: String,
    /// Our identifier for the buyer, echoed back by the processor
    pub client_reference_id: String,
}

impl SessionRequest {
    /// Sum of `unit_amount_cents * quantity` over all lines.
    #[must_use]
    pub fn amount_total_cents(&self) -> i64 {
        self.line_items
            .iter()
            .map(|item| item.unit_amount_cents.saturating_mul(i64::from(item.quantity)))
            .fold(0, i64::saturating_add)
    }
}

/// Processor-side state of a session as far as checkout cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub id: String,
    /// Hosted page the customer is redirected to; absent once the session is closed
    pub url: Option<String>,
    pub paid: bool,
    pub amount_total_cents: Option<i64>,
}

/// A payment processor that hosts the payment page.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Opens a new hosted payment session.
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession>;

    /// Fetches the current state of a session.
    async fn retrieve_session(&self, session_id: &str) -> Result<PaymentSession>;
}
