//! Customer notification seam for issued fiscal documents.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use brisaerp_fiscal::FiscalDocument;
use brisaerp_sales::SalesDocument;

/// Result of one delivery attempt.
///
/// Ephemeral by contract: returned to the caller for surfacing, never
/// persisted and never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub delivered: bool,
    /// Address the attempt targeted, when the customer has one.
    pub recipient: Option<String>,
    /// Failure reason, present only when `delivered` is false.
    pub reason: Option<String>,
}

impl NotificationOutcome {
    pub fn delivered(recipient: impl Into<String>) -> Self {
        Self {
            delivered: true,
            recipient: Some(recipient.into()),
            reason: None,
        }
    }

    pub fn failed(recipient: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            delivered: false,
            recipient,
            reason: Some(reason.into()),
        }
    }
}

/// Delivery seam for issued fiscal documents.
///
/// Implementations must not panic across this boundary and should bound the
/// attempt with a timeout, reporting it as a failed outcome. A delivery
/// failure is never an issuance failure.
pub trait NotificationDispatcher: Send + Sync {
    fn send(&self, order: &SalesDocument, fiscal: &FiscalDocument) -> NotificationOutcome;
}

impl<N> NotificationDispatcher for Arc<N>
where
    N: NotificationDispatcher + ?Sized,
{
    fn send(&self, order: &SalesDocument, fiscal: &FiscalDocument) -> NotificationOutcome {
        (**self).send(order, fiscal)
    }
}

/// In-memory dispatcher for tests/dev: records every attempt and can be
/// configured to fail with a fixed reason.
#[derive(Debug, Default)]
pub struct InMemoryNotificationDispatcher {
    fail_reason: Option<String>,
    attempts: Mutex<Vec<NotificationOutcome>>,
}

impl InMemoryNotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_reason: Some(reason.into()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Every outcome this dispatcher has produced, in order.
    pub fn attempts(&self) -> Vec<NotificationOutcome> {
        self.attempts
            .lock()
            .map(|attempts| attempts.clone())
            .unwrap_or_default()
    }
}

impl NotificationDispatcher for InMemoryNotificationDispatcher {
    fn send(&self, order: &SalesDocument, fiscal: &FiscalDocument) -> NotificationOutcome {
        let outcome = match (&order.customer().email, &self.fail_reason) {
            (None, _) => NotificationOutcome::failed(None, "customer has no email address"),
            (Some(email), Some(reason)) => {
                NotificationOutcome::failed(Some(email.clone()), reason.clone())
            }
            (Some(email), None) => {
                tracing::info!(
                    "fiscal document {} emailed to {}",
                    fiscal.formatted_number(),
                    email
                );
                NotificationOutcome::delivered(email.clone())
            }
        };
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(outcome.clone());
        }
        outcome
    }
}
