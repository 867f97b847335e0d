//! Commercial documents: orders, quotes and estimates.
//!
//! One aggregate covers the three kinds; the kind-specific lifecycle lives in
//! [`DocumentState`] so an order's payment status and a quote's revision
//! counter cannot leak onto the other kinds. Monetary totals are recomputed
//! from the line items on every edit and never accepted from callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brisaerp_core::{CustomerId, DocumentId, DomainError, DomainResult, div_round_half_up};

use crate::status::{
    EstimateStatus, Lifecycle, OrderStatus, PaymentStatus, QuoteStatus, is_eligible_for_invoicing,
};

/// Commercial document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Order,
    Quote,
    Estimate,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Order => "order",
            DocumentKind::Quote => "quote",
            DocumentKind::Estimate => "estimate",
        }
    }
}

/// Postal address printed on fiscal artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Customer data snapshotted onto the document. The customer registry itself
/// is outside this crate; documents carry everything rendering needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    /// Destination for fiscal notifications; customers without an address
    /// simply cannot be notified.
    pub email: Option<String>,
    pub tax_id: String,
    pub billing_address: Address,
    pub shipping_address: Address,
}

fn default_unit() -> String {
    "un".to_string()
}

/// One product line, owned exclusively by its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
    /// Unit of measure label (e.g. "un", "kg").
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: i64,
    /// Whole-percent discount, 0..=100.
    #[serde(default)]
    pub discount_percent: u8,
}

impl LineItem {
    /// quantity x unit_price minus the discount, rounded half-up to a cent.
    pub fn subtotal(&self) -> i64 {
        let gross = self.quantity as i128 * self.unit_price as i128;
        // Bound untrusted values before the discount math.
        let gross = gross.clamp(-(i64::MAX as i128), i64::MAX as i128);
        let percent = 100 - i128::from(self.discount_percent.min(100));
        div_round_half_up(gross * percent, 100)
    }

    /// This line's share of the document-level tax, apportioned by subtotal
    /// and rounded half-up.
    pub fn tax_share(&self, document_subtotal: i64, document_tax: i64) -> i64 {
        if document_subtotal <= 0 {
            return 0;
        }
        div_round_half_up(
            self.subtotal() as i128 * document_tax as i128,
            document_subtotal as i128,
        )
    }

    /// Line subtotal plus its proportional tax share.
    pub fn total(&self, document_subtotal: i64, document_tax: i64) -> i64 {
        self.subtotal() + self.tax_share(document_subtotal, document_tax)
    }
}

/// Monetary totals of a document, in integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: i64,
    pub tax_total: i64,
    pub shipping_cost: i64,
    pub other_costs: i64,
    pub total_amount: i64,
}

impl DocumentTotals {
    /// Recompute totals from the line items and ancillary charges.
    pub fn from_items(
        items: &[LineItem],
        tax_total: i64,
        shipping_cost: i64,
        other_costs: i64,
    ) -> DomainResult<Self> {
        let subtotal: i128 = items.iter().map(|item| item.subtotal() as i128).sum();
        let total = subtotal
            + tax_total as i128
            + shipping_cost as i128
            + other_costs as i128;
        if subtotal > i64::MAX as i128 || total > i64::MAX as i128 {
            return Err(DomainError::invariant("document total overflow"));
        }
        Ok(Self {
            subtotal: subtotal as i64,
            tax_total,
            shipping_cost,
            other_costs,
            total_amount: total as i64,
        })
    }

    /// Whether the grand total reconciles with its components within
    /// `tolerance_cents`.
    pub fn is_consistent(&self, tolerance_cents: i64) -> bool {
        let expected = self.subtotal + self.tax_total + self.shipping_cost + self.other_costs;
        (expected - self.total_amount).abs() <= tolerance_cents
    }

    pub fn is_non_negative(&self) -> bool {
        self.subtotal >= 0
            && self.tax_total >= 0
            && self.shipping_cost >= 0
            && self.other_costs >= 0
            && self.total_amount >= 0
    }
}

/// Kind-specific lifecycle state. Payment status exists only on orders and
/// the revision counter only on quotes, so the variants carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DocumentState {
    Order {
        status: OrderStatus,
        payment_status: PaymentStatus,
    },
    Quote {
        status: QuoteStatus,
        revision: u32,
    },
    Estimate {
        status: EstimateStatus,
    },
}

/// Inputs for creating a document. The commercial workflow assembles these;
/// validation happens in [`SalesDocument::create`].
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub number: String,
    pub customer_id: CustomerId,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub tax_total: i64,
    pub shipping_cost: i64,
    pub other_costs: i64,
    pub payment_method: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A commercial document: order, quote or estimate.
///
/// Fields are private; all mutation goes through methods that keep the totals
/// and the lifecycle machines honest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDocument {
    id: DocumentId,
    number: String,
    customer_id: CustomerId,
    customer: CustomerInfo,
    items: Vec<LineItem>,
    totals: DocumentTotals,
    state: DocumentState,
    payment_method: Option<String>,
    delivery_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SalesDocument {
    /// Validate the inputs and create the document in its kind's initial
    /// status (orders: pending, quotes: draft, estimates: pending).
    pub fn create(input: NewDocument) -> DomainResult<Self> {
        if input.number.trim().is_empty() {
            return Err(DomainError::validation("document number must not be empty"));
        }
        validate_items(&input.items)?;
        validate_charges(input.tax_total, input.shipping_cost, input.other_costs)?;
        let totals = DocumentTotals::from_items(
            &input.items,
            input.tax_total,
            input.shipping_cost,
            input.other_costs,
        )?;

        let state = match input.kind {
            DocumentKind::Order => DocumentState::Order {
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Pending,
            },
            DocumentKind::Quote => DocumentState::Quote {
                status: QuoteStatus::Draft,
                revision: 0,
            },
            DocumentKind::Estimate => DocumentState::Estimate {
                status: EstimateStatus::Pending,
            },
        };

        Ok(Self {
            id: DocumentId::new(),
            number: input.number,
            customer_id: input.customer_id,
            customer: input.customer,
            items: input.items,
            totals,
            state,
            payment_method: input.payment_method,
            delivery_date: input.delivery_date,
            notes: input.notes,
            created_at: input.created_at,
            updated_at: input.created_at,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> &DocumentTotals {
        &self.totals
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn delivery_date(&self) -> Option<DateTime<Utc>> {
        self.delivery_date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn kind(&self) -> DocumentKind {
        match self.state {
            DocumentState::Order { .. } => DocumentKind::Order,
            DocumentState::Quote { .. } => DocumentKind::Quote,
            DocumentState::Estimate { .. } => DocumentKind::Estimate,
        }
    }

    /// Current lifecycle status as its wire label.
    pub fn status_label(&self) -> &'static str {
        match self.state {
            DocumentState::Order { status, .. } => status.as_str(),
            DocumentState::Quote { status, .. } => status.as_str(),
            DocumentState::Estimate { status } => status.as_str(),
        }
    }

    /// The order status, when this document is an order.
    pub fn order_status(&self) -> Option<OrderStatus> {
        match self.state {
            DocumentState::Order { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Whether a fiscal document may be issued against this document right
    /// now. Always false for quotes and estimates.
    pub fn is_eligible_for_invoicing(&self) -> bool {
        match self.state {
            DocumentState::Order { status, .. } => is_eligible_for_invoicing(status),
            _ => false,
        }
    }

    /// Replace the line items and ancillary charges, recomputing the totals.
    ///
    /// Editing a quote after it was first sent bumps its revision counter.
    /// Edits never touch lifecycle status; an already-issued fiscal document
    /// keeps its own snapshot of the totals.
    pub fn set_items(
        &mut self,
        items: Vec<LineItem>,
        tax_total: i64,
        shipping_cost: i64,
        other_costs: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        validate_items(&items)?;
        validate_charges(tax_total, shipping_cost, other_costs)?;
        self.totals = DocumentTotals::from_items(&items, tax_total, shipping_cost, other_costs)?;
        self.items = items;
        if let DocumentState::Quote { status, revision } = &mut self.state {
            if *status != QuoteStatus::Draft {
                *revision += 1;
            }
        }
        self.updated_at = now;
        Ok(())
    }

    /// Move an order to `next`, enforcing the order transition table.
    pub fn transition_order(&mut self, next: OrderStatus, now: DateTime<Utc>) -> DomainResult<()> {
        match &mut self.state {
            DocumentState::Order { status, .. } => {
                if !status.can_transition_to(next) {
                    return Err(DomainError::invariant(format!(
                        "order cannot move from '{}' to '{}'",
                        status.as_str(),
                        next.as_str()
                    )));
                }
                *status = next;
                self.updated_at = now;
                Ok(())
            }
            _ => Err(DomainError::validation("document is not an order")),
        }
    }

    /// Move a quote to `next`, enforcing the quote transition table.
    pub fn transition_quote(&mut self, next: QuoteStatus, now: DateTime<Utc>) -> DomainResult<()> {
        match &mut self.state {
            DocumentState::Quote { status, .. } => {
                if !status.can_transition_to(next) {
                    return Err(DomainError::invariant(format!(
                        "quote cannot move from '{}' to '{}'",
                        status.as_str(),
                        next.as_str()
                    )));
                }
                *status = next;
                self.updated_at = now;
                Ok(())
            }
            _ => Err(DomainError::validation("document is not a quote")),
        }
    }

    /// Move an estimate to `next`, enforcing the estimate transition table.
    pub fn transition_estimate(
        &mut self,
        next: EstimateStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        match &mut self.state {
            DocumentState::Estimate { status } => {
                if !status.can_transition_to(next) {
                    return Err(DomainError::invariant(format!(
                        "estimate cannot move from '{}' to '{}'",
                        status.as_str(),
                        next.as_str()
                    )));
                }
                *status = next;
                self.updated_at = now;
                Ok(())
            }
            _ => Err(DomainError::validation("document is not an estimate")),
        }
    }

    /// Set the payment status. Only orders track payment.
    pub fn set_payment_status(
        &mut self,
        next: PaymentStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        match &mut self.state {
            DocumentState::Order { payment_status, .. } => {
                *payment_status = next;
                self.updated_at = now;
                Ok(())
            }
            _ => Err(DomainError::validation("document is not an order")),
        }
    }
}

fn validate_items(items: &[LineItem]) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::validation(
            "document must have at least one line item",
        ));
    }
    for item in items {
        if item.quantity <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        if item.unit_price <= 0 {
            return Err(DomainError::validation("line unit_price must be positive"));
        }
        if item.discount_percent > 100 {
            return Err(DomainError::validation(
                "line discount_percent must be between 0 and 100",
            ));
        }
        let gross = item.quantity as i128 * item.unit_price as i128;
        if gross > i64::MAX as i128 {
            return Err(DomainError::invariant("line amount overflow"));
        }
    }
    Ok(())
}

fn validate_charges(tax_total: i64, shipping_cost: i64, other_costs: i64) -> DomainResult<()> {
    if tax_total < 0 || shipping_cost < 0 || other_costs < 0 {
        return Err(DomainError::validation("charges must not be negative"));
    }
    Ok(())
}
