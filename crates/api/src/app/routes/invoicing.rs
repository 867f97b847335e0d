use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use brisaerp_core::DocumentId;
use brisaerp_fiscal::RenderedFiscalArtifact;
use brisaerp_infra::document_store::DocumentStore;
use brisaerp_infra::issuance::IssueOptions;
use brisaerp_sales::OrderStatus;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:id/invoice", post(issue_invoice).get(get_fiscal_document))
        .route("/:id/invoice/email", post(resend_invoice_email))
        .route("/:id/invoice/xml", get(get_invoice_xml))
        .route("/:id/invoice/danfe", get(get_invoice_danfe))
}

pub async fn issue_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Option<Json<dto::IssueInvoiceRequest>>,
) -> axum::response::Response {
    let order_id: DocumentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid document id")
        }
    };
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let outcome = match services.issuance.issue(
        &order_id,
        IssueOptions {
            send_email: request.send_email,
        },
    ) {
        Ok(o) => o,
        Err(e) => return errors::issuance_error_to_response(e),
    };

    // Billing follow-up: an order invoiced straight from "approved" moves on
    // to "billed". Issuance already succeeded, so a failure here only logs.
    if let Ok(order) = services.store.fetch_order(&order_id) {
        if order.order_status() == Some(OrderStatus::Approved) {
            if let Err(e) = services
                .store
                .update_order_status(&order_id, OrderStatus::Billed)
            {
                tracing::warn!("order {} issued but not marked billed: {e}", order_id);
            }
        }
    }

    (
        StatusCode::CREATED,
        Json(dto::issuance_outcome_to_json(&outcome)),
    )
        .into_response()
}

pub async fn get_fiscal_document(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: DocumentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid document id")
        }
    };

    match services.store.fetch_fiscal_document(&order_id) {
        Ok(Some(fiscal)) => {
            (StatusCode::OK, Json(dto::fiscal_document_to_json(&fiscal))).into_response()
        }
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "no fiscal document issued for this order",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn resend_invoice_email(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: DocumentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid document id")
        }
    };

    match services.issuance.resend_email(&order_id) {
        Ok(outcome) => (StatusCode::OK, Json(dto::notification_to_json(&outcome))).into_response(),
        Err(e) => errors::issuance_error_to_response(e),
    }
}

pub async fn get_invoice_xml(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match rendered_artifacts(&services, &id) {
        Ok(artifact) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml")],
            artifact.xml,
        )
            .into_response(),
        Err(response) => response,
    }
}

pub async fn get_invoice_danfe(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match rendered_artifacts(&services, &id) {
        Ok(artifact) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            artifact.danfe,
        )
            .into_response(),
        Err(response) => response,
    }
}

/// Fetches the order and its fiscal record, rendering both artifact forms.
///
/// Artifacts are rendered on demand from the stored snapshot rather than
/// persisted at issuance time.
fn rendered_artifacts(
    services: &AppServices,
    raw_id: &str,
) -> Result<RenderedFiscalArtifact, axum::response::Response> {
    let order_id: DocumentId = match raw_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid document id",
            ))
        }
    };

    let order = match services.store.fetch_order(&order_id) {
        Ok(doc) => doc,
        Err(e) => return Err(errors::store_error_to_response(e)),
    };
    let fiscal = match services.store.fetch_fiscal_document(&order_id) {
        Ok(Some(f)) => f,
        Ok(None) => {
            return Err(errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                "no fiscal document issued for this order",
            ))
        }
        Err(e) => return Err(errors::store_error_to_response(e)),
    };

    Ok(brisaerp_fiscal::render(&order, &fiscal, Utc::now()))
}
