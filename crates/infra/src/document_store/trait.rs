use std::sync::Arc;

use thiserror::Error;

use brisaerp_core::DocumentId;
use brisaerp_fiscal::FiscalDocument;
use brisaerp_sales::{OrderStatus, SalesDocument};

/// Document store operation error.
///
/// These are **infrastructure errors** (storage failures, duplicate fiscal
/// records) as opposed to domain errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document with the requested id.
    #[error("document not found")]
    NotFound,

    /// An authorized fiscal document already exists for the order.
    #[error("a fiscal document was already issued for this order")]
    AlreadyIssued,

    /// The backend failed; the caller must treat the write outcome as unknown.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Storage boundary for commercial documents and their fiscal records.
///
/// ## Design Principles
///
/// - **No storage assumptions**: works with the in-memory implementation
///   (tests/dev) and future SQL backends (production)
/// - **One id space**: orders, quotes and estimates share it; callers check
///   the document kind, not the store
/// - **At most one authorized fiscal document per order**: enforced by
///   `persist_fiscal_document`, the way a unique index would be
///
/// ## Fiscal Persistence Semantics
///
/// `persist_fiscal_document()`:
/// - rejects with `AlreadyIssued` when an authorized record is already
///   present for the order
/// - a rejected record may be superseded by a later attempt
/// - the duplicate check and the insert must be atomic, so concurrent
///   issuance of the same order yields exactly one success
pub trait DocumentStore: Send + Sync {
    /// Insert or replace a commercial document.
    fn upsert_document(&self, document: SalesDocument) -> Result<(), StoreError>;

    /// Fetch a document by id.
    fn fetch_order(&self, id: &DocumentId) -> Result<SalesDocument, StoreError>;

    /// All documents, ordered by creation time.
    fn list_documents(&self) -> Result<Vec<SalesDocument>, StoreError>;

    /// Apply an order status transition and return the updated document.
    ///
    /// Transition legality is enforced through the status model; callers are
    /// expected to pre-check, so a rejection surfaces as `Storage`.
    fn update_order_status(
        &self,
        id: &DocumentId,
        next: OrderStatus,
    ) -> Result<SalesDocument, StoreError>;

    /// Associate a fiscal document with an order.
    fn persist_fiscal_document(
        &self,
        order_id: &DocumentId,
        fiscal: FiscalDocument,
    ) -> Result<(), StoreError>;

    /// The fiscal document issued for an order, if any.
    fn fetch_fiscal_document(
        &self,
        order_id: &DocumentId,
    ) -> Result<Option<FiscalDocument>, StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn upsert_document(&self, document: SalesDocument) -> Result<(), StoreError> {
        (**self).upsert_document(document)
    }

    fn fetch_order(&self, id: &DocumentId) -> Result<SalesDocument, StoreError> {
        (**self).fetch_order(id)
    }

    fn list_documents(&self) -> Result<Vec<SalesDocument>, StoreError> {
        (**self).list_documents()
    }

    fn update_order_status(
        &self,
        id: &DocumentId,
        next: OrderStatus,
    ) -> Result<SalesDocument, StoreError> {
        (**self).update_order_status(id, next)
    }

    fn persist_fiscal_document(
        &self,
        order_id: &DocumentId,
        fiscal: FiscalDocument,
    ) -> Result<(), StoreError> {
        (**self).persist_fiscal_document(order_id, fiscal)
    }

    fn fetch_fiscal_document(
        &self,
        order_id: &DocumentId,
    ) -> Result<Option<FiscalDocument>, StoreError> {
        (**self).fetch_fiscal_document(order_id)
    }
}
