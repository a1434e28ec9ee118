//! Client for the Stripe Checkout Sessions API.
//!
//! Requests are form-encoded and authenticated with the secret key as a bearer
//! token. Line items use inline `price_data`, so no products need to exist on
//! the Stripe side.

use super::{PaymentGateway, PaymentSession, SessionRequest};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Checkout session as returned by Stripe (only the fields we read)
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    /// "paid", "unpaid" or "no_payment_required"
    payment_status: String,
    amount_total: Option<i64>,
}

impl From<StripeSession> for PaymentSession {
    fn from(session: StripeSession) -> Self {
        Self {
            paid: session.payment_status == "paid",
            id: session.id,
            url: session.url,
            amount_total_cents: session.amount_total,
        }
    }
}

/// Stripe-backed [`PaymentGateway`]
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl StripeGateway {
    #[must_use]
    pub fn new(api_base: &str, secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    async fn read_session(response: reqwest::Response) -> Result<PaymentSession> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Payment {
                message: format!("stripe api error status={} body={body}", status.as_u16()),
            });
        }
        let session: StripeSession = serde_json::from_str(&body).map_err(|e| Error::Payment {
            message: format!("invalid stripe response: {e}; body={body}"),
        })?;
        Ok(session.into())
    }
}

/// Flattens a session request into Stripe's bracketed form fields.
fn session_form(request: &SessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("customer_email".to_string(), request.customer_email.clone()),
        (
            "client_reference_id".to_string(),
            request.client_reference_id.clone(),
        ),
    ];
    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount_cents.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(lines = request.line_items.len()))]
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&session_form(request))
            .send()
            .await?;
        let session = Self::read_session(response).await?;
        debug!("Opened payment session {}", session.id);
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> Result<PaymentSession> {
        let response = self
            .client
            .get(format!("{}/v1/checkout/sessions/{session_id}", self.api_base))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        Self::read_session(response).await
    }
}
