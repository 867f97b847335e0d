#[tokio::main]
async fn main() {
    brisaerp_observability::init();

    let bind_addr = std::env::var("BRISAERP_BIND").unwrap_or_else(|_| {
        tracing::warn!("BRISAERP_BIND not set; using dev default 0.0.0.0:8080");
        "0.0.0.0:8080".to_string()
    });

    let app = brisaerp_api::app::build_app();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
