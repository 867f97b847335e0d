//! Allocation seam for fiscal numbers and access keys.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use brisaerp_core::DocumentId;

/// Number and access key reserved for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalGrant {
    /// Sequential fiscal number, unique within a series.
    pub number: u64,
    pub series: u16,
    /// 44-digit numeric access key; opaque to business logic.
    pub access_key: String,
}

/// Failure reported by the fiscal authority.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    #[error("fiscal authority rejected the reservation: {0}")]
    Rejected(String),
    #[error("fiscal authority unavailable: {0}")]
    Unavailable(String),
}

/// Reserves fiscal numbers and access keys.
///
/// `reserve` must be idempotent per order: asking again for the same order
/// returns the grant already made, so a failed persistence attempt never
/// burns a number. A SEFAZ-backed implementation slots in here.
pub trait FiscalAuthority: Send + Sync {
    fn reserve(&self, order_id: &DocumentId) -> Result<FiscalGrant, AuthorityError>;
}

impl<A> FiscalAuthority for Arc<A>
where
    A: FiscalAuthority + ?Sized,
{
    fn reserve(&self, order_id: &DocumentId) -> Result<FiscalGrant, AuthorityError> {
        (**self).reserve(order_id)
    }
}

#[derive(Debug, Default)]
struct AllocatorState {
    issued: u64,
    grants: HashMap<DocumentId, FiscalGrant>,
}

/// In-memory monotonic allocator for development and tests.
///
/// Numbers start at 1 and never repeat within the series; repeated calls for
/// the same order return the original grant.
#[derive(Debug)]
pub struct SequentialFiscalAuthority {
    series: u16,
    inner: Mutex<AllocatorState>,
}

impl SequentialFiscalAuthority {
    /// The series wraps at three digits; the access key reserves exactly
    /// three for it.
    pub fn new(series: u16) -> Self {
        Self {
            series: series % 1000,
            inner: Mutex::new(AllocatorState::default()),
        }
    }

    pub fn series(&self) -> u16 {
        self.series
    }

    /// How many numbers have been handed out.
    pub fn allocated(&self) -> u64 {
        self.inner.lock().map(|state| state.issued).unwrap_or(0)
    }
}

impl FiscalAuthority for SequentialFiscalAuthority {
    fn reserve(&self, order_id: &DocumentId) -> Result<FiscalGrant, AuthorityError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| AuthorityError::Unavailable("lock poisoned".to_string()))?;
        if let Some(grant) = state.grants.get(order_id) {
            return Ok(grant.clone());
        }
        let number = state.issued + 1;
        let grant = FiscalGrant {
            number,
            series: self.series,
            access_key: access_key_for(self.series, number, order_id),
        };
        state.issued = number;
        state.grants.insert(*order_id, grant.clone());
        Ok(grant)
    }
}

/// 44 digits: series (3) + number (9) + a 32-digit fold of the order id.
/// Only the length follows the official key layout; the real authority owns
/// the format.
fn access_key_for(series: u16, number: u64, order_id: &DocumentId) -> String {
    let fold = order_id.as_uuid().as_u128() % 100_000_000_000_000_000_000_000_000_000_000;
    format!("{:03}{:09}{:032}", series, number, fold)
}
