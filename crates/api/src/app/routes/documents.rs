use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use brisaerp_core::{CustomerId, DocumentId};
use brisaerp_infra::document_store::DocumentStore;
use brisaerp_sales::{DocumentKind, NewDocument, SalesDocument};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_document).get(list_documents))
        .route("/:id", get(get_document))
        .route("/:id/status", post(transition_status))
}

pub async fn create_document(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateDocumentRequest>,
) -> axum::response::Response {
    let customer_id = match body.customer_id {
        Some(raw) => match raw.parse::<CustomerId>() {
            Ok(id) => id,
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id")
            }
        },
        None => CustomerId::new(),
    };

    let document = match SalesDocument::create(NewDocument {
        kind: body.kind,
        number: body.number,
        customer_id,
        customer: body.customer,
        items: body.items,
        tax_total: body.tax_total,
        shipping_cost: body.shipping_cost,
        other_costs: body.other_costs,
        payment_method: body.payment_method,
        delivery_date: body.delivery_date,
        notes: body.notes,
        created_at: Utc::now(),
    }) {
        Ok(doc) => doc,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.store.upsert_document(document.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::document_to_json(&document))).into_response()
}

pub async fn list_documents(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let documents = match services.store.list_documents() {
        Ok(docs) => docs,
        Err(e) => return errors::store_error_to_response(e),
    };

    let items: Vec<_> = documents.iter().map(dto::document_to_json).collect();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_document(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let document_id: DocumentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid document id")
        }
    };

    match services.store.fetch_order(&document_id) {
        Ok(doc) => (StatusCode::OK, Json(dto::document_to_json(&doc))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn transition_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::TransitionStatusRequest>,
) -> axum::response::Response {
    let document_id: DocumentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid document id")
        }
    };

    let mut document = match services.store.fetch_order(&document_id) {
        Ok(doc) => doc,
        Err(e) => return errors::store_error_to_response(e),
    };

    let now = Utc::now();
    let result = match document.kind() {
        DocumentKind::Order => body
            .status
            .parse()
            .and_then(|next| document.transition_order(next, now)),
        DocumentKind::Quote => body
            .status
            .parse()
            .and_then(|next| document.transition_quote(next, now)),
        DocumentKind::Estimate => body
            .status
            .parse()
            .and_then(|next| document.transition_estimate(next, now)),
    };
    if let Err(e) = result {
        return errors::domain_error_to_response(e);
    }

    if let Err(e) = services.store.upsert_document(document.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::document_to_json(&document))).into_response()
}
