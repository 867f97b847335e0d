//! Builds fiscal documents from eligible orders.

use chrono::{DateTime, Utc};
use thiserror::Error;

use brisaerp_core::format_cents;
use brisaerp_sales::SalesDocument;

use crate::authority::{AuthorityError, FiscalAuthority};
use crate::document::{FiscalDocument, FiscalEnvironment, IssuanceStatus, SellerInfo};

/// Totals must reconcile within one cent; absorbs rounding drift in data
/// imported from the legacy system.
pub const TOTALS_TOLERANCE_CENTS: i64 = 1;

/// Failure while building a fiscal document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The document is not an order in an invoicing-eligible status.
    #[error("document is not an order in an invoicing-eligible status")]
    InvalidOrderState,

    /// The stored totals are negative or do not reconcile.
    #[error("document totals are inconsistent: {detail}")]
    InconsistentTotals { detail: String },

    /// The fiscal authority failed to reserve a number and key.
    #[error("fiscal authority error: {0}")]
    Authority(String),
}

impl BuildError {
    fn inconsistent(detail: impl Into<String>) -> Self {
        Self::InconsistentTotals {
            detail: detail.into(),
        }
    }
}

impl From<AuthorityError> for BuildError {
    fn from(value: AuthorityError) -> Self {
        BuildError::Authority(value.to_string())
    }
}

/// Assembles a [`FiscalDocument`] from an order.
///
/// The builder re-validates kind, status and totals even though callers
/// check eligibility first: it is the last gate before a fiscal number is
/// consumed. Validation always runs before the authority is touched, so an
/// ineligible order never reserves a number.
#[derive(Debug)]
pub struct FiscalDocumentBuilder<A> {
    authority: A,
    seller: SellerInfo,
    environment: FiscalEnvironment,
}

impl<A> FiscalDocumentBuilder<A> {
    pub fn new(authority: A, seller: SellerInfo, environment: FiscalEnvironment) -> Self {
        Self {
            authority,
            seller,
            environment,
        }
    }

    pub fn environment(&self) -> FiscalEnvironment {
        self.environment
    }
}

impl<A: FiscalAuthority> FiscalDocumentBuilder<A> {
    pub fn build(&self, order: &SalesDocument) -> Result<FiscalDocument, BuildError> {
        self.build_at(order, Utc::now())
    }

    /// Like [`build`](Self::build) with an explicit issuance instant.
    pub fn build_at(
        &self,
        order: &SalesDocument,
        issued_at: DateTime<Utc>,
    ) -> Result<FiscalDocument, BuildError> {
        if !order.is_eligible_for_invoicing() {
            return Err(BuildError::InvalidOrderState);
        }

        let totals = *order.totals();
        if !totals.is_non_negative() {
            return Err(BuildError::inconsistent("totals contain negative amounts"));
        }
        if !totals.is_consistent(TOTALS_TOLERANCE_CENTS) {
            let components =
                totals.subtotal + totals.tax_total + totals.shipping_cost + totals.other_costs;
            return Err(BuildError::inconsistent(format!(
                "grand total is {} but components sum to {}",
                format_cents(totals.total_amount),
                format_cents(components),
            )));
        }
        let line_sum: i64 = order.items().iter().map(|item| item.subtotal()).sum();
        if (line_sum - totals.subtotal).abs() > TOTALS_TOLERANCE_CENTS {
            return Err(BuildError::inconsistent(format!(
                "line items sum to {} but subtotal is {}",
                format_cents(line_sum),
                format_cents(totals.subtotal),
            )));
        }

        let grant = self.authority.reserve(&order.id())?;

        Ok(FiscalDocument::new(
            grant.number,
            grant.series,
            grant.access_key,
            order.id(),
            issued_at,
            self.environment,
            self.seller.clone(),
            totals,
            format!("/documents/{}/invoice/xml", order.id()),
            format!("/documents/{}/invoice/danfe", order.id()),
            IssuanceStatus::Authorized,
        ))
    }
}
