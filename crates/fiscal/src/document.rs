//! The issued fiscal document record.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brisaerp_core::{DocumentId, DomainError};
use brisaerp_sales::DocumentTotals;

/// NF-e emission environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalEnvironment {
    Homologation,
    Production,
}

impl FiscalEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            FiscalEnvironment::Homologation => "homologation",
            FiscalEnvironment::Production => "production",
        }
    }
}

impl FromStr for FiscalEnvironment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "homologation" | "homologacao" => Ok(FiscalEnvironment::Homologation),
            "production" | "producao" => Ok(FiscalEnvironment::Production),
            other => Err(DomainError::validation(format!(
                "unknown fiscal environment '{other}'"
            ))),
        }
    }
}

/// Issuing company block stamped onto every fiscal document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerInfo {
    pub name: String,
    pub tax_id: String,
}

/// Outcome recorded on the fiscal document itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum IssuanceStatus {
    Authorized,
    Rejected { reason: String },
}

/// An issued NF-e record tied to one order.
///
/// Everything here is a snapshot taken at build time. Fields are private and
/// there are no setters: once authorized, number, key and totals never
/// change, regardless of what happens to the order afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalDocument {
    number: u64,
    series: u16,
    access_key: String,
    order_id: DocumentId,
    issued_at: DateTime<Utc>,
    environment: FiscalEnvironment,
    seller: SellerInfo,
    totals: DocumentTotals,
    xml_url: String,
    danfe_url: String,
    status: IssuanceStatus,
}

impl FiscalDocument {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        number: u64,
        series: u16,
        access_key: String,
        order_id: DocumentId,
        issued_at: DateTime<Utc>,
        environment: FiscalEnvironment,
        seller: SellerInfo,
        totals: DocumentTotals,
        xml_url: String,
        danfe_url: String,
        status: IssuanceStatus,
    ) -> Self {
        Self {
            number,
            series,
            access_key,
            order_id,
            issued_at,
            environment,
            seller,
            totals,
            xml_url,
            danfe_url,
            status,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Fiscal number zero-padded to the nine digits printed on artifacts.
    pub fn formatted_number(&self) -> String {
        format!("{:09}", self.number)
    }

    pub fn series(&self) -> u16 {
        self.series
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn order_id(&self) -> DocumentId {
        self.order_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn environment(&self) -> FiscalEnvironment {
        self.environment
    }

    pub fn seller(&self) -> &SellerInfo {
        &self.seller
    }

    /// Totals as they stood on the order when the document was built.
    pub fn totals(&self) -> &DocumentTotals {
        &self.totals
    }

    pub fn xml_url(&self) -> &str {
        &self.xml_url
    }

    pub fn danfe_url(&self) -> &str {
        &self.danfe_url
    }

    pub fn status(&self) -> &IssuanceStatus {
        &self.status
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self.status, IssuanceStatus::Authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_number_pads_to_nine_digits() {
        let doc = FiscalDocument::new(
            42,
            1,
            "0".repeat(44),
            DocumentId::new(),
            Utc::now(),
            FiscalEnvironment::Homologation,
            SellerInfo {
                name: "Seller".to_string(),
                tax_id: "00.000.000/0001-91".to_string(),
            },
            DocumentTotals {
                subtotal: 100,
                tax_total: 0,
                shipping_cost: 0,
                other_costs: 0,
                total_amount: 100,
            },
            "/x".to_string(),
            "/d".to_string(),
            IssuanceStatus::Authorized,
        );
        assert_eq!(doc.formatted_number(), "000000042");
        assert!(doc.is_authorized());
    }

    #[test]
    fn environment_parses_both_vocabularies() {
        assert_eq!(
            "producao".parse::<FiscalEnvironment>().unwrap(),
            FiscalEnvironment::Production
        );
        assert_eq!(
            "homologation".parse::<FiscalEnvironment>().unwrap(),
            FiscalEnvironment::Homologation
        );
        assert!("staging".parse::<FiscalEnvironment>().is_err());
    }

    #[test]
    fn issuance_status_serializes_tagged() {
        let authorized = serde_json::to_value(IssuanceStatus::Authorized).unwrap();
        assert_eq!(authorized["result"], "authorized");

        let rejected = serde_json::to_value(IssuanceStatus::Rejected {
            reason: "schema mismatch".to_string(),
        })
        .unwrap();
        assert_eq!(rejected["result"], "rejected");
        assert_eq!(rejected["reason"], "schema mismatch");
    }
}
