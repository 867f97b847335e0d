use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;

use brisaerp_core::CustomerId;
use brisaerp_fiscal::{
    render, FiscalDocumentBuilder, FiscalEnvironment, SellerInfo, SequentialFiscalAuthority,
};
use brisaerp_sales::{
    Address, CustomerInfo, DocumentKind, LineItem, NewDocument, OrderStatus, SalesDocument,
};

fn seller() -> SellerInfo {
    SellerInfo {
        name: "BrisaERP Demo Ltda".to_string(),
        tax_id: "00.000.000/0001-91".to_string(),
    }
}

fn order_with_items(count: usize) -> SalesDocument {
    let address = Address {
        street: "Rua das Flores, 100".to_string(),
        city: "Blumenau".to_string(),
        state: "SC".to_string(),
        postal_code: "89010-000".to_string(),
    };
    let items = (0..count)
        .map(|i| LineItem {
            product_code: format!("SKU-{i:04}"),
            product_name: format!("Product {i}"),
            quantity: (i % 5 + 1) as i64,
            unit: "un".to_string(),
            unit_price: 10_00 + i as i64 * 25,
            discount_percent: (i % 3 * 5) as u8,
        })
        .collect();
    let mut order = SalesDocument::create(NewDocument {
        kind: DocumentKind::Order,
        number: "bench".to_string(),
        customer_id: CustomerId::new(),
        customer: CustomerInfo {
            name: "Mercado Central Ltda".to_string(),
            email: Some("compras@mercadocentral.example".to_string()),
            tax_id: "12.345.678/0001-00".to_string(),
            billing_address: address.clone(),
            shipping_address: address,
        },
        items,
        tax_total: 0,
        shipping_cost: 0,
        other_costs: 0,
        payment_method: Some("pix".to_string()),
        delivery_date: None,
        notes: None,
        created_at: Utc::now(),
    })
    .unwrap();
    order
        .transition_order(OrderStatus::Approved, Utc::now())
        .unwrap();
    order
}

fn bench_document_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("fiscal_document_build");
    group.sample_size(1000);

    // Benchmark: fresh order each iteration (allocation path)
    group.bench_function("build_fresh_order", |b| {
        let builder = FiscalDocumentBuilder::new(
            SequentialFiscalAuthority::new(1),
            seller(),
            FiscalEnvironment::Homologation,
        );
        b.iter(|| {
            let order = order_with_items(3);
            black_box(builder.build(&order).unwrap());
        });
    });

    // Benchmark: same order each iteration (idempotent grant path)
    group.bench_function("rebuild_same_order", |b| {
        let builder = FiscalDocumentBuilder::new(
            SequentialFiscalAuthority::new(1),
            seller(),
            FiscalEnvironment::Homologation,
        );
        let order = order_with_items(3);
        b.iter(|| {
            black_box(builder.build(black_box(&order)).unwrap());
        });
    });

    group.finish();
}

fn bench_artifact_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("artifact_rendering");

    for item_count in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*item_count as u64));
        group.bench_with_input(
            BenchmarkId::new("render_both_forms", item_count),
            item_count,
            |b, &count| {
                let order = order_with_items(count);
                let fiscal = FiscalDocumentBuilder::new(
                    SequentialFiscalAuthority::new(1),
                    seller(),
                    FiscalEnvironment::Homologation,
                )
                .build(&order)
                .unwrap();
                let generated_at = Utc::now();

                b.iter(|| {
                    black_box(render(&order, &fiscal, generated_at));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_document_build, bench_artifact_rendering);
criterion_main!(benches);
