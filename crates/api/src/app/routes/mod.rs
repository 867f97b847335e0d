use axum::Router;

pub mod documents;
pub mod invoicing;
pub mod system;

/// Router for all document endpoints.
pub fn router() -> Router {
    Router::new().nest("/documents", documents::router().merge(invoicing::router()))
}
