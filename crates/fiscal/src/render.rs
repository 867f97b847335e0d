//! Deterministic rendering of fiscal artifacts.
//!
//! Both forms are produced from the same inputs: the machine-readable XML
//! filed with the authority and the printable DANFE summary. Rendering is a
//! pure function of `(order, fiscal, generated_at)`; identical inputs yield
//! byte-identical output. The generation timestamp occupies exactly one XML
//! element and one DANFE line so comparisons can mask it.
//!
//! Line amounts are computed from the document lines; the financial summary
//! is printed from the fiscal document's totals snapshot, never recomputed.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use brisaerp_core::format_cents;
use brisaerp_sales::{Address, SalesDocument};

use crate::document::FiscalDocument;

/// Machine-readable and printable forms of one fiscal document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFiscalArtifact {
    pub xml: String,
    pub danfe: String,
}

/// Render both artifact forms.
pub fn render(
    order: &SalesDocument,
    fiscal: &FiscalDocument,
    generated_at: DateTime<Utc>,
) -> RenderedFiscalArtifact {
    RenderedFiscalArtifact {
        xml: render_xml(order, fiscal, generated_at),
        danfe: render_danfe(order, fiscal, generated_at),
    }
}

fn render_xml(
    order: &SalesDocument,
    fiscal: &FiscalDocument,
    generated_at: DateTime<Utc>,
) -> String {
    let totals = order.totals();
    let snapshot = fiscal.totals();
    let customer = order.customer();
    let mut xml = String::new();

    let _ = writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        xml,
        r#"<fiscalDocument environment="{}">"#,
        fiscal.environment().as_str()
    );
    let _ = writeln!(
        xml,
        "  <generatedAt>{}</generatedAt>",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let _ = writeln!(xml, "  <header>");
    let _ = writeln!(
        xml,
        "    <fiscalNumber>{}</fiscalNumber>",
        fiscal.formatted_number()
    );
    let _ = writeln!(xml, "    <series>{:03}</series>", fiscal.series());
    let _ = writeln!(xml, "    <accessKey>{}</accessKey>", fiscal.access_key());
    let _ = writeln!(
        xml,
        "    <documentKind>{}</documentKind>",
        order.kind().as_str()
    );
    let _ = writeln!(
        xml,
        "    <documentNumber>{}</documentNumber>",
        xml_escape(order.number())
    );
    let _ = writeln!(xml, "  </header>");

    let _ = writeln!(xml, "  <dates>");
    let _ = writeln!(
        xml,
        "    <emission>{}</emission>",
        fiscal.issued_at().format("%Y-%m-%d")
    );
    if let Some(delivery) = order.delivery_date() {
        let _ = writeln!(
            xml,
            "    <delivery>{}</delivery>",
            delivery.format("%Y-%m-%d")
        );
    }
    let _ = writeln!(xml, "  </dates>");

    let _ = writeln!(xml, "  <customer>");
    let _ = writeln!(xml, "    <name>{}</name>", xml_escape(&customer.name));
    let _ = writeln!(xml, "    <taxId>{}</taxId>", xml_escape(&customer.tax_id));
    if let Some(email) = &customer.email {
        let _ = writeln!(xml, "    <email>{}</email>", xml_escape(email));
    }
    let _ = writeln!(xml, "  </customer>");

    let _ = writeln!(xml, "  <seller>");
    let _ = writeln!(
        xml,
        "    <name>{}</name>",
        xml_escape(&fiscal.seller().name)
    );
    let _ = writeln!(
        xml,
        "    <taxId>{}</taxId>",
        xml_escape(&fiscal.seller().tax_id)
    );
    let _ = writeln!(xml, "  </seller>");

    let _ = writeln!(xml, "  <addresses>");
    write_xml_address(&mut xml, "billing", &customer.billing_address);
    write_xml_address(&mut xml, "shipping", &customer.shipping_address);
    let _ = writeln!(xml, "  </addresses>");

    let _ = writeln!(xml, "  <payment>");
    let _ = writeln!(
        xml,
        "    <method>{}</method>",
        xml_escape(order.payment_method().unwrap_or("-"))
    );
    let _ = writeln!(xml, "  </payment>");

    let _ = writeln!(xml, "  <items>");
    for (index, item) in order.items().iter().enumerate() {
        let subtotal = item.subtotal();
        let total = item.total(totals.subtotal, totals.tax_total);
        let _ = writeln!(xml, r#"    <item number="{}">"#, index + 1);
        let _ = writeln!(xml, "      <code>{}</code>", xml_escape(&item.product_code));
        let _ = writeln!(xml, "      <name>{}</name>", xml_escape(&item.product_name));
        let _ = writeln!(xml, "      <quantity>{}</quantity>", item.quantity);
        let _ = writeln!(xml, "      <unit>{}</unit>", xml_escape(&item.unit));
        let _ = writeln!(
            xml,
            "      <unitPrice>{}</unitPrice>",
            format_cents(item.unit_price)
        );
        let _ = writeln!(
            xml,
            "      <discountPercent>{}</discountPercent>",
            item.discount_percent
        );
        let _ = writeln!(xml, "      <subtotal>{}</subtotal>", format_cents(subtotal));
        let _ = writeln!(xml, "      <total>{}</total>", format_cents(total));
        let _ = writeln!(xml, "    </item>");
    }
    let _ = writeln!(xml, "  </items>");

    let _ = writeln!(xml, "  <summary>");
    let _ = writeln!(
        xml,
        "    <subtotal>{}</subtotal>",
        format_cents(snapshot.subtotal)
    );
    let _ = writeln!(xml, "    <tax>{}</tax>", format_cents(snapshot.tax_total));
    let _ = writeln!(
        xml,
        "    <shipping>{}</shipping>",
        format_cents(snapshot.shipping_cost)
    );
    let _ = writeln!(
        xml,
        "    <otherCosts>{}</otherCosts>",
        format_cents(snapshot.other_costs)
    );
    let _ = writeln!(
        xml,
        "    <grandTotal>{}</grandTotal>",
        format_cents(snapshot.total_amount)
    );
    let _ = writeln!(xml, "  </summary>");

    if let Some(notes) = order.notes() {
        let _ = writeln!(xml, "  <notes>{}</notes>", xml_escape(notes));
    }
    let _ = writeln!(xml, "</fiscalDocument>");
    xml
}

fn write_xml_address(xml: &mut String, label: &str, address: &Address) {
    let _ = writeln!(xml, "    <{label}>");
    let _ = writeln!(xml, "      <street>{}</street>", xml_escape(&address.street));
    let _ = writeln!(xml, "      <city>{}</city>", xml_escape(&address.city));
    let _ = writeln!(xml, "      <state>{}</state>", xml_escape(&address.state));
    let _ = writeln!(
        xml,
        "      <postalCode>{}</postalCode>",
        xml_escape(&address.postal_code)
    );
    let _ = writeln!(xml, "    </{label}>");
}

fn render_danfe(
    order: &SalesDocument,
    fiscal: &FiscalDocument,
    generated_at: DateTime<Utc>,
) -> String {
    let totals = order.totals();
    let snapshot = fiscal.totals();
    let customer = order.customer();
    let mut out = String::new();

    let heavy = "=".repeat(97);
    let light = "-".repeat(97);

    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, " DANFE - Documento Auxiliar da Nota Fiscal Eletronica");
    let _ = writeln!(out, " Environment: {}", fiscal.environment().as_str());
    let _ = writeln!(
        out,
        " Generated at: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out, "{light}");
    let _ = writeln!(
        out,
        " NF-e: {}  Series: {:03}  Document: {} ({})",
        fiscal.formatted_number(),
        fiscal.series(),
        clean(order.number()),
        order.kind().as_str()
    );
    let _ = writeln!(out, " Access key: {}", fiscal.access_key());
    let _ = writeln!(
        out,
        " Emission date: {}",
        fiscal.issued_at().format("%Y-%m-%d")
    );
    if let Some(delivery) = order.delivery_date() {
        let _ = writeln!(out, " Delivery date: {}", delivery.format("%Y-%m-%d"));
    }
    let _ = writeln!(out, "{light}");
    let _ = writeln!(
        out,
        " Customer: {}  (tax id {})",
        clean(&customer.name),
        clean(&customer.tax_id)
    );
    if let Some(email) = &customer.email {
        let _ = writeln!(out, " Email: {}", clean(email));
    }
    let _ = writeln!(
        out,
        " Seller: {}  (tax id {})",
        clean(&fiscal.seller().name),
        clean(&fiscal.seller().tax_id)
    );
    let _ = writeln!(
        out,
        " Billing address: {}",
        danfe_address(&customer.billing_address)
    );
    let _ = writeln!(
        out,
        " Shipping address: {}",
        danfe_address(&customer.shipping_address)
    );
    let _ = writeln!(out, " Payment: {}", clean(order.payment_method().unwrap_or("-")));
    let _ = writeln!(out, "{light}");
    let _ = writeln!(
        out,
        " {:<10} {:<28} {:>6} {:<4} {:>12} {:>5} {:>12} {:>12}",
        "CODE", "DESCRIPTION", "QTY", "UN", "UNIT PRICE", "DISC%", "SUBTOTAL", "TOTAL"
    );
    for item in order.items() {
        let subtotal = item.subtotal();
        let total = item.total(totals.subtotal, totals.tax_total);
        let _ = writeln!(
            out,
            " {:<10} {:<28} {:>6} {:<4} {:>12} {:>5} {:>12} {:>12}",
            clip(&item.product_code, 10),
            clip(&item.product_name, 28),
            item.quantity,
            clip(&item.unit, 4),
            format_cents(item.unit_price),
            item.discount_percent,
            format_cents(subtotal),
            format_cents(total)
        );
    }
    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, " {:<12} {:>12}", "Subtotal:", format_cents(snapshot.subtotal));
    let _ = writeln!(out, " {:<12} {:>12}", "Tax:", format_cents(snapshot.tax_total));
    let _ = writeln!(
        out,
        " {:<12} {:>12}",
        "Shipping:",
        format_cents(snapshot.shipping_cost)
    );
    let _ = writeln!(
        out,
        " {:<12} {:>12}",
        "Other costs:",
        format_cents(snapshot.other_costs)
    );
    let _ = writeln!(
        out,
        " {:<12} {:>12}",
        "GRAND TOTAL:",
        format_cents(snapshot.total_amount)
    );
    if let Some(notes) = order.notes() {
        let _ = writeln!(out, " Notes: {}", clean(notes));
    }
    let _ = writeln!(out, "{heavy}");
    out
}

fn danfe_address(address: &Address) -> String {
    format!(
        "{}, {} - {}, {}",
        clean(&address.street),
        clean(&address.city),
        clean(&address.state),
        clean(&address.postal_code)
    )
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Collapse control characters so one field stays on one printed line.
fn clean(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn clip(value: &str, max: usize) -> String {
    clean(value).chars().take(max).collect()
}
