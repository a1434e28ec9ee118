//! In-memory payment gateway.

use super::{PaymentGateway, PaymentSession, SessionRequest};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Records every session it opens; nothing is paid until [`FakeGateway::mark_paid`].
#[derive(Default)]
pub struct FakeGateway {
    pub sessions: Mutex<HashMap<String, PaymentSession>>,
    pub requests: Mutex<Vec<SessionRequest>>,
    pub retrieve_calls: AtomicU64,
    next_id: AtomicU64,
}

impl FakeGateway {
    /// Marks a session as paid for its full amount.
    ///
    /// # Errors
    /// Returns `Error::CheckoutSessionNotFound` for unknown sessions.
    pub async fn mark_paid(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| Error::CheckoutSessionNotFound {
                session_id: session_id.to_string(),
            })?;
        session.paid = true;
        session.url = None;
        Ok(())
    }

    /// Overrides the amount the processor reports for a session.
    ///
    /// # Errors
    /// Returns `Error::CheckoutSessionNotFound` for unknown sessions.
    pub async fn set_amount(&self, session_id: &str, amount_total_cents: i64) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| Error::CheckoutSessionNotFound {
                session_id: session_id.to_string(),
            })?;
        session.amount_total_cents = Some(amount_total_cents);
        Ok(())
    }

    /// The most recent session request.
    pub async fn last_request(&self) -> Option<SessionRequest> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("cs_test_{n}");
        let session = PaymentSession {
            id: id.clone(),
            url: Some(format!("https://pay.test/{id}")),
            paid: false,
            amount_total_cents: Some(request.amount_total_cents()),
        };
        self.requests.lock().await.push(request.clone());
        self.sessions.lock().await.insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<PaymentSession> {
        self.retrieve_calls.fetch_add(1, Ordering::Relaxed);
        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::Payment {
                message: format!("No such checkout session: {session_id}"),
            })
    }
}
