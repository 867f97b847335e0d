//! Infrastructure layer: document persistence seams, notification dispatch,
//! and the fiscal issuance pipeline that ties them together.

pub mod document_store;
pub mod issuance;
pub mod notification;
