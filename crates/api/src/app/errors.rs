use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use brisaerp_core::DomainError;
use brisaerp_infra::document_store::StoreError;
use brisaerp_infra::issuance::IssuanceError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "document not found"),
        StoreError::AlreadyIssued => json_error(
            StatusCode::CONFLICT,
            "already_issued",
            "order already has an authorized fiscal document",
        ),
        StoreError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

/// Issuance failures use the `{"success": false, "error": ...}` shape the
/// invoicing frontend expects.
pub fn issuance_error_to_response(err: IssuanceError) -> axum::response::Response {
    let (status, message) = match err {
        IssuanceError::NotFound => (StatusCode::NOT_FOUND, "order not found".to_string()),
        IssuanceError::InvalidState { .. } => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        IssuanceError::AlreadyIssued => (StatusCode::CONFLICT, err.to_string()),
        IssuanceError::Build(build) => {
            tracing::error!("fiscal document build failed: {build}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "fiscal document could not be generated".to_string(),
            )
        }
        IssuanceError::Storage(detail) => {
            tracing::error!(
                "fiscal document storage failed: {detail} (check whether the fiscal number was consumed)"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "fiscal document storage failed".to_string(),
            )
        }
    };

    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message,
        })),
    )
        .into_response()
}
