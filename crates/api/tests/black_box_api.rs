use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = brisaerp_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn order_body(number: &str, email: Option<&str>) -> serde_json::Value {
    json!({
        "kind": "order",
        "number": number,
        "customer": {
            "name": "Mercado Central Ltda",
            "email": email,
            "tax_id": "12.345.678/0001-00",
            "billing_address": {
                "street": "Rua das Flores, 100",
                "city": "Blumenau",
                "state": "SC",
                "postal_code": "89010-000"
            },
            "shipping_address": {
                "street": "Av. Beira Rio, 1200",
                "city": "Blumenau",
                "state": "SC",
                "postal_code": "89012-000"
            }
        },
        "items": [
            {
                "product_code": "A1",
                "product_name": "Widget",
                "quantity": 2,
                "unit_price": 10000
            }
        ],
        "tax_total": 2000,
        "shipping_cost": 1000,
        "payment_method": "pix"
    })
}

async fn create_order(
    client: &reqwest::Client,
    base_url: &str,
    number: &str,
    email: Option<&str>,
) -> String {
    let res = client
        .post(format!("{}/documents", base_url))
        .json(&order_body(number, email))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn transition(client: &reqwest::Client, base_url: &str, id: &str, status: &str) {
    let res = client
        .post(format!("{}/documents/{}/status", base_url, id))
        .json(&json!({ "status": status }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn order_lifecycle_create_approve_issue_fetch_artifacts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create_order(
        &client,
        &srv.base_url,
        "2024-01",
        Some("compras@mercadocentral.example"),
    )
    .await;

    // Fresh order is pending and not invoiceable.
    let res = client
        .get(format!("{}/documents/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: serde_json::Value = res.json().await.unwrap();
    assert_eq!(doc["status"], "pending");
    assert_eq!(doc["can_invoice"], false);

    // Issuing now is refused, with the error shape the frontend renders.
    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("pending"));

    // Approve using the Portuguese vocabulary an older client sends.
    transition(&client, &srv.base_url, &id, "aprovado").await;

    let res = client
        .get(format!("{}/documents/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    let doc: serde_json::Value = res.json().await.unwrap();
    assert_eq!(doc["status"], "approved");
    assert_eq!(doc["can_invoice"], true);

    // Issue without email.
    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, id))
        .json(&json!({ "send_email": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    let nfe_number = body["nfe_number"].as_str().unwrap().to_string();
    assert_eq!(nfe_number, "000000001");
    let access_key = body["access_key"].as_str().unwrap().to_string();
    assert_eq!(access_key.len(), 44);
    assert!(access_key.chars().all(|c| c.is_ascii_digit()));
    assert!(body["pdf_url"].as_str().unwrap().ends_with("/danfe"));
    assert!(body["xml_url"].as_str().unwrap().ends_with("/xml"));
    assert!(body.get("emailSent").is_none());

    // The approved order moved on to billed.
    let res = client
        .get(format!("{}/documents/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    let doc: serde_json::Value = res.json().await.unwrap();
    assert_eq!(doc["status"], "billed");

    // Fiscal record.
    let res = client
        .get(format!("{}/documents/{}/invoice", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fiscal: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fiscal["nfe_number"], "000000001");
    assert_eq!(fiscal["access_key"].as_str().unwrap(), access_key);
    assert_eq!(fiscal["totals"]["total_amount"], 23000);
    assert_eq!(fiscal["status"]["result"], "authorized");
    assert_eq!(fiscal["environment"], "homologation");

    // XML artifact.
    let res = client
        .get(format!("{}/documents/{}/invoice/xml", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()[reqwest::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/xml"));
    let xml = res.text().await.unwrap();
    assert!(xml.contains(&access_key));
    assert!(xml.contains("<fiscalNumber>000000001</fiscalNumber>"));

    // DANFE artifact.
    let res = client
        .get(format!("{}/documents/{}/invoice/danfe", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let danfe = res.text().await.unwrap();
    assert!(danfe.contains("DANFE - Documento Auxiliar"));
    assert!(danfe.contains(&access_key));
}

#[tokio::test]
async fn issuing_twice_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create_order(&client, &srv.base_url, "2024-02", None).await;
    transition(&client, &srv.base_url, &id, "approved").await;

    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn quotes_cannot_be_invoiced() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = order_body("2024-Q1", None);
    body["kind"] = json!("quote");
    let res = client
        .post(format!("{}/documents", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["can_invoice"], false);

    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn email_delivery_and_resend() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create_order(
        &client,
        &srv.base_url,
        "2024-03",
        Some("compras@mercadocentral.example"),
    )
    .await;
    transition(&client, &srv.base_url, &id, "approved").await;

    // The frontend sends camelCase.
    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, id))
        .json(&json!({ "sendEmail": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["emailSent"], true);
    assert!(body.get("emailMessage").is_none());

    let res = client
        .post(format!("{}/documents/{}/invoice/email", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["sent"], true);
    assert_eq!(body["recipient"], "compras@mercadocentral.example");
}

#[tokio::test]
async fn issuance_survives_missing_customer_email() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create_order(&client, &srv.base_url, "2024-04", None).await;
    transition(&client, &srv.base_url, &id, "approved").await;

    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, id))
        .json(&json!({ "send_email": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["emailSent"], false);
    assert_eq!(body["emailMessage"], "customer has no email address");

    // The document is durable despite the failed delivery.
    let res = client
        .get(format!("{}/documents/{}/invoice", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_status_transitions_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create_order(&client, &srv.base_url, "2024-05", None).await;

    // Legal vocabulary, illegal move.
    let res = client
        .post(format!("{}/documents/{}/status", srv.base_url, id))
        .json(&json!({ "status": "billed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown vocabulary.
    let res = client
        .post(format!("{}/documents/{}/status", srv.base_url, id))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_documents_are_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let missing = "0192f3a0-5be7-7d10-91a5-3d1a2b4c5d60";

    let res = client
        .get(format!("{}/documents/{}", srv.base_url, missing))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/documents/{}/invoice", srv.base_url, missing))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // Resending before issuing anything is also a 404.
    let id = create_order(&client, &srv.base_url, "2024-06", None).await;
    let res = client
        .post(format!("{}/documents/{}/invoice/email", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/documents/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
