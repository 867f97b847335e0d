//! Sales documents domain module (orders, quotes, estimates).
//!
//! This crate contains business rules for commercial documents, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod document;
pub mod status;

pub use document::{
    Address, CustomerInfo, DocumentKind, DocumentState, DocumentTotals, LineItem, NewDocument,
    SalesDocument,
};
pub use status::{
    EstimateStatus, Lifecycle, OrderStatus, PaymentStatus, QuoteStatus, is_eligible_for_invoicing,
};
