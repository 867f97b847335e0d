//! Fiscal documents (NF-e): number and access-key allocation, building from
//! eligible orders, and deterministic rendering of the XML and DANFE
//! artifacts.
//!
//! Pure domain logic plus the allocation seam; no HTTP, no storage.

pub mod authority;
pub mod builder;
pub mod document;
pub mod render;

pub use authority::{AuthorityError, FiscalAuthority, FiscalGrant, SequentialFiscalAuthority};
pub use builder::{BuildError, FiscalDocumentBuilder, TOTALS_TOLERANCE_CENTS};
pub use document::{FiscalDocument, FiscalEnvironment, IssuanceStatus, SellerInfo};
pub use render::{RenderedFiscalArtifact, render};
