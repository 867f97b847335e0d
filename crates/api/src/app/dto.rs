use serde::Deserialize;

use brisaerp_fiscal::FiscalDocument;
use brisaerp_infra::issuance::IssuanceOutcome;
use brisaerp_infra::notification::NotificationOutcome;
use brisaerp_sales::{CustomerInfo, DocumentKind, LineItem, SalesDocument};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub kind: DocumentKind,
    pub number: String,
    /// Omitted for walk-in customers; the server mints an id.
    pub customer_id: Option<String>,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub tax_total: i64,
    #[serde(default)]
    pub shipping_cost: i64,
    #[serde(default)]
    pub other_costs: i64,
    pub payment_method: Option<String>,
    pub delivery_date: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionStatusRequest {
    pub status: String,
}

/// Body of `POST /documents/:id/invoice`; the whole body is optional.
///
/// The `sendEmail` alias keeps older frontend clients working.
#[derive(Debug, Default, Deserialize)]
pub struct IssueInvoiceRequest {
    #[serde(default, alias = "sendEmail")]
    pub send_email: bool,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn document_to_json(doc: &SalesDocument) -> serde_json::Value {
    serde_json::json!({
        "id": doc.id().to_string(),
        "number": doc.number(),
        "kind": doc.kind().as_str(),
        "customer_id": doc.customer_id().to_string(),
        "customer": doc.customer(),
        "items": doc.items(),
        "totals": doc.totals(),
        "state": doc.state(),
        "status": doc.status_label(),
        "can_invoice": doc.is_eligible_for_invoicing(),
        "payment_method": doc.payment_method(),
        "delivery_date": doc.delivery_date(),
        "notes": doc.notes(),
        "created_at": doc.created_at(),
        "updated_at": doc.updated_at(),
    })
}

pub fn fiscal_document_to_json(fiscal: &FiscalDocument) -> serde_json::Value {
    serde_json::json!({
        "nfe_number": fiscal.formatted_number(),
        "series": fiscal.series(),
        "access_key": fiscal.access_key(),
        "order_id": fiscal.order_id().to_string(),
        "issued_at": fiscal.issued_at(),
        "environment": fiscal.environment().as_str(),
        "seller": fiscal.seller(),
        "totals": fiscal.totals(),
        "status": fiscal.status(),
        "xml_url": fiscal.xml_url(),
        // The DANFE is served as the printable document; older clients
        // still read it from "pdf_url".
        "pdf_url": fiscal.danfe_url(),
    })
}

pub fn issuance_outcome_to_json(outcome: &IssuanceOutcome) -> serde_json::Value {
    let mut body = serde_json::json!({
        "success": true,
        "nfe_number": outcome.fiscal.formatted_number(),
        "access_key": outcome.fiscal.access_key(),
        "pdf_url": outcome.fiscal.danfe_url(),
        "xml_url": outcome.fiscal.xml_url(),
    });
    if let Some(email) = &outcome.email {
        body["emailSent"] = serde_json::json!(email.delivered);
        if let Some(reason) = &email.reason {
            body["emailMessage"] = serde_json::json!(reason);
        }
    }
    body
}

pub fn notification_to_json(outcome: &NotificationOutcome) -> serde_json::Value {
    serde_json::json!({
        "sent": outcome.delivered,
        "recipient": outcome.recipient,
        "reason": outcome.reason,
    })
}
