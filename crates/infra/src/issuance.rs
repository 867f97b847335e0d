//! Invoice issuance pipeline.
//!
//! ```text
//! fetch order -> eligibility gate -> build (reserves fiscal number)
//!     -> persist (at most one authorized per order) -> email (optional)
//! ```
//!
//! Issuance is the durable fact; notification is best-effort and never rolls
//! it back. The eligibility gate runs before the builder so ineligible orders
//! never consume a fiscal number, and a storage failure after reservation is
//! retryable because the authority hands back the same grant for the same
//! order.

use thiserror::Error;

use brisaerp_core::DocumentId;
use brisaerp_fiscal::{BuildError, FiscalAuthority, FiscalDocument, FiscalDocumentBuilder};

use crate::document_store::{DocumentStore, StoreError};
use crate::notification::{NotificationDispatcher, NotificationOutcome};

/// Per-call knobs for [`IssuanceService::issue`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueOptions {
    /// Attempt customer email delivery once the document is persisted.
    pub send_email: bool,
}

/// What one successful issuance produced.
#[derive(Debug, Clone)]
pub struct IssuanceOutcome {
    pub fiscal: FiscalDocument,
    /// Present only when the caller asked for email delivery.
    pub email: Option<NotificationOutcome>,
}

#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("order not found")]
    NotFound,
    #[error("order status '{status}' does not allow fiscal issuance")]
    InvalidState { status: String },
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("order already has an authorized fiscal document")]
    AlreadyIssued,
    #[error("document storage failed: {0}")]
    Storage(String),
}

impl From<StoreError> for IssuanceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyIssued => Self::AlreadyIssued,
            StoreError::Storage(message) => Self::Storage(message),
        }
    }
}

/// Drives an order through fiscal issuance against pluggable storage,
/// numbering authority and notification backends.
pub struct IssuanceService<S, A, N> {
    store: S,
    builder: FiscalDocumentBuilder<A>,
    notifier: N,
}

impl<S, A, N> IssuanceService<S, A, N>
where
    S: DocumentStore,
    A: FiscalAuthority,
    N: NotificationDispatcher,
{
    pub fn new(store: S, builder: FiscalDocumentBuilder<A>, notifier: N) -> Self {
        Self {
            store,
            builder,
            notifier,
        }
    }

    /// Issues a fiscal document for the given order.
    ///
    /// Fails without touching the numbering authority when the order is
    /// missing or not in an invoiceable status. Concurrent calls for the same
    /// order resolve to exactly one success; the losers see `AlreadyIssued`.
    pub fn issue(
        &self,
        order_id: &DocumentId,
        options: IssueOptions,
    ) -> Result<IssuanceOutcome, IssuanceError> {
        let order = self.store.fetch_order(order_id)?;
        if !order.is_eligible_for_invoicing() {
            return Err(IssuanceError::InvalidState {
                status: order.status_label().to_string(),
            });
        }

        let fiscal = self.builder.build(&order)?;
        self.store.persist_fiscal_document(order_id, fiscal.clone())?;
        tracing::info!(
            "fiscal document {} authorized for order {}",
            fiscal.formatted_number(),
            order.number()
        );

        let email = if options.send_email {
            let outcome = self.notifier.send(&order, &fiscal);
            if !outcome.delivered {
                tracing::warn!(
                    "invoice email for order {} not delivered: {}",
                    order.number(),
                    outcome.reason.as_deref().unwrap_or("unknown reason")
                );
            }
            Some(outcome)
        } else {
            None
        };

        Ok(IssuanceOutcome { fiscal, email })
    }

    /// Re-sends the invoice email using the stored snapshot.
    ///
    /// Never rebuilds or re-numbers; fails with `NotFound` when no fiscal
    /// document has been issued for the order yet.
    pub fn resend_email(
        &self,
        order_id: &DocumentId,
    ) -> Result<NotificationOutcome, IssuanceError> {
        let order = self.store.fetch_order(order_id)?;
        let fiscal = self
            .store
            .fetch_fiscal_document(order_id)?
            .ok_or(IssuanceError::NotFound)?;
        Ok(self.notifier.send(&order, &fiscal))
    }
}
