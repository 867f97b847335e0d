//! Lifecycle state machines for commercial documents.
//!
//! Three document kinds carry three independent machines that share one
//! mechanical shape: a status enum plus an explicit transition table. The
//! legacy system gated behavior on raw status strings; here every check goes
//! through typed enums, and the Portuguese wire values are accepted as input
//! aliases for order statuses.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use brisaerp_core::DomainError;

/// Shared shape of a document lifecycle.
pub trait Lifecycle: Copy + Eq {
    /// Stable lowercase label used in payloads and error messages.
    fn as_str(&self) -> &'static str;

    /// Terminal states have no outgoing transitions.
    fn is_terminal(&self) -> bool;

    /// Whether the machine permits moving from `self` to `next`.
    fn can_transition_to(&self, next: Self) -> bool;
}

/// Sales order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting commercial approval.
    #[serde(alias = "pendente")]
    Pending,
    /// Commercially approved; eligible for fiscal issuance.
    #[serde(alias = "aprovado")]
    Approved,
    /// A fiscal document has been issued against the order.
    #[serde(alias = "faturado")]
    Billed,
    #[serde(alias = "cancelado")]
    Cancelled,
}

impl Lifecycle for OrderStatus {
    fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Billed => "billed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Billed | OrderStatus::Cancelled)
    }

    fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Approved)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Approved, OrderStatus::Billed)
                | (OrderStatus::Approved, OrderStatus::Cancelled)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "pendente" => Ok(OrderStatus::Pending),
            "approved" | "aprovado" => Ok(OrderStatus::Approved),
            "billed" | "faturado" => Ok(OrderStatus::Billed),
            "cancelled" | "cancelado" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// Whether an order status allows fiscal issuance.
///
/// The gate is "approved or later": already-billed orders stay eligible so
/// the duplicate check happens against the fiscal record, not the status.
pub fn is_eligible_for_invoicing(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Approved | OrderStatus::Billed)
}

/// Quote lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Expired,
}

impl Lifecycle for QuoteStatus {
    fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Rejected | QuoteStatus::Expired)
    }

    fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (QuoteStatus::Sent, QuoteStatus::Approved)
                | (QuoteStatus::Sent, QuoteStatus::Rejected)
                | (QuoteStatus::Sent, QuoteStatus::Expired)
                // Re-negotiation reopens an approved quote.
                | (QuoteStatus::Approved, QuoteStatus::Sent)
        )
    }
}

impl FromStr for QuoteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "approved" => Ok(QuoteStatus::Approved),
            "rejected" => Ok(QuoteStatus::Rejected),
            "expired" => Ok(QuoteStatus::Expired),
            other => Err(DomainError::validation(format!(
                "unknown quote status '{other}'"
            ))),
        }
    }
}

/// Estimate lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    Pending,
    Sent,
    Accepted,
    Rejected,
}

impl Lifecycle for EstimateStatus {
    fn as_str(&self) -> &'static str {
        match self {
            EstimateStatus::Pending => "pending",
            EstimateStatus::Sent => "sent",
            EstimateStatus::Accepted => "accepted",
            EstimateStatus::Rejected => "rejected",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, EstimateStatus::Rejected)
    }

    fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (EstimateStatus::Pending, EstimateStatus::Sent)
                | (EstimateStatus::Sent, EstimateStatus::Accepted)
                | (EstimateStatus::Sent, EstimateStatus::Rejected)
        )
    }
}

impl FromStr for EstimateStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EstimateStatus::Pending),
            "sent" => Ok(EstimateStatus::Sent),
            "accepted" => Ok(EstimateStatus::Accepted),
            "rejected" => Ok(EstimateStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "unknown estimate status '{other}'"
            ))),
        }
    }
}

/// Payment status tracked on orders, independent of the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}
