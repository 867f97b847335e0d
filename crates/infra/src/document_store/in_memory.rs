use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use brisaerp_core::DocumentId;
use brisaerp_fiscal::FiscalDocument;
use brisaerp_sales::{OrderStatus, SalesDocument};

use super::r#trait::{DocumentStore, StoreError};

/// In-memory document store.
///
/// Intended for tests/dev. The write lock over the fiscal map is the
/// serialization point for concurrent issuance of the same order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, SalesDocument>>,
    fiscal: RwLock<HashMap<DocumentId, FiscalDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn upsert_document(&self, document: SalesDocument) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        documents.insert(document.id(), document);
        Ok(())
    }

    fn fetch_order(&self, id: &DocumentId) -> Result<SalesDocument, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        documents.get(id).cloned().ok_or(StoreError::NotFound)
    }

    fn list_documents(&self) -> Result<Vec<SalesDocument>, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let mut all: Vec<SalesDocument> = documents.values().cloned().collect();
        // HashMap iteration order is arbitrary; present a stable listing.
        all.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.number().cmp(b.number()))
        });
        Ok(all)
    }

    fn update_order_status(
        &self,
        id: &DocumentId,
        next: OrderStatus,
    ) -> Result<SalesDocument, StoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let document = documents.get_mut(id).ok_or(StoreError::NotFound)?;
        document
            .transition_order(next, Utc::now())
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(document.clone())
    }

    fn persist_fiscal_document(
        &self,
        order_id: &DocumentId,
        fiscal_document: FiscalDocument,
    ) -> Result<(), StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        if !documents.contains_key(order_id) {
            return Err(StoreError::NotFound);
        }

        let mut fiscal = self
            .fiscal
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        match fiscal.get(order_id) {
            // Only an authorized record blocks re-issuance; a rejected one
            // may be replaced by a later attempt.
            Some(existing) if existing.is_authorized() => Err(StoreError::AlreadyIssued),
            _ => {
                fiscal.insert(*order_id, fiscal_document);
                Ok(())
            }
        }
    }

    fn fetch_fiscal_document(
        &self,
        order_id: &DocumentId,
    ) -> Result<Option<FiscalDocument>, StoreError> {
        let fiscal = self
            .fiscal
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(fiscal.get(order_id).cloned())
    }
}
