use std::sync::Arc;

use brisaerp_fiscal::{
    FiscalDocumentBuilder, FiscalEnvironment, SellerInfo, SequentialFiscalAuthority,
};
use brisaerp_infra::document_store::InMemoryDocumentStore;
use brisaerp_infra::issuance::IssuanceService;
use brisaerp_infra::notification::InMemoryNotificationDispatcher;

/// Issuance pipeline as wired for this binary.
pub type AppIssuanceService = IssuanceService<
    Arc<InMemoryDocumentStore>,
    Arc<SequentialFiscalAuthority>,
    Arc<InMemoryNotificationDispatcher>,
>;

/// Shared application services handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<InMemoryDocumentStore>,
    pub issuance: Arc<AppIssuanceService>,
}

/// Wire the backends from environment configuration.
pub fn build_services() -> AppServices {
    let seller = SellerInfo {
        name: env_or("BRISAERP_SELLER_NAME", "BrisaERP Demo Ltda"),
        tax_id: env_or("BRISAERP_SELLER_TAX_ID", "00.000.000/0001-91"),
    };

    let series = std::env::var("BRISAERP_FISCAL_SERIES")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(1);

    let environment = std::env::var("BRISAERP_FISCAL_ENV")
        .ok()
        .and_then(|raw| raw.parse::<FiscalEnvironment>().ok())
        .unwrap_or(FiscalEnvironment::Homologation);

    let store = Arc::new(InMemoryDocumentStore::new());
    let authority = Arc::new(SequentialFiscalAuthority::new(series));
    let notifier = Arc::new(InMemoryNotificationDispatcher::new());
    let issuance = Arc::new(IssuanceService::new(
        Arc::clone(&store),
        FiscalDocumentBuilder::new(authority, seller, environment),
        notifier,
    ));

    AppServices { store, issuance }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        tracing::warn!("{key} not set; using dev default");
        default.to_string()
    })
}
