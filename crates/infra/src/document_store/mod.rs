//! Commercial document persistence boundary.
//!
//! This module defines an infrastructure-facing abstraction for storing
//! documents and their fiscal records without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{DocumentStore, StoreError};
